//! Actions and the per-state / per-machine tables that hold them.

use crate::core::state::{BoxError, State, StateRef};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::rc::Rc;

/// Resolved outcome of an event: the state to move to and the value to emit.
pub struct Action<E, V> {
    pub next: StateRef<E, V>,
    pub output: Option<V>,
}

impl<E, V> Action<E, V> {
    /// A Mealy action: the output belongs to the edge.
    pub fn new(next: StateRef<E, V>, output: Option<V>) -> Self {
        Self { next, output }
    }

    /// A Moore action: move to `state` and emit the state's own value.
    pub fn moore(state: &StateRef<E, V>) -> Self
    where
        V: Clone,
    {
        Self::new(Rc::clone(state), state.value().cloned())
    }
}

impl<E, V: Clone> Clone for Action<E, V> {
    fn clone(&self) -> Self {
        Self {
            next: Rc::clone(&self.next),
            output: self.output.clone(),
        }
    }
}

impl<E, V: Debug> Debug for Action<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("next", &self.next.ident())
            .field("output", &self.output)
            .finish()
    }
}

/// Shorthand for the Moore action of a concrete shared state.
///
/// ```rust
/// use statemach::core::{MooreAction, StateNode};
/// use std::rc::Rc;
///
/// let green = Rc::new(StateNode::<u8, &str>::with_value("green", "GREEN"));
/// let action = green.action();
///
/// assert_eq!(action.output, Some("GREEN"));
/// ```
pub trait MooreAction<E, V> {
    /// `(self, self.value)` as an action.
    fn action(&self) -> Action<E, V>;
}

impl<E, V, S> MooreAction<E, V> for Rc<S>
where
    S: State<E, V> + 'static,
    E: 'static,
    V: Clone + 'static,
{
    fn action(&self) -> Action<E, V> {
        let next: StateRef<E, V> = Rc::clone(self) as StateRef<E, V>;
        Action::moore(&next)
    }
}

/// Caller logic that computes an action when the event is resolved.
pub type Resolver<E, V> = Rc<dyn Fn(&E) -> Result<Action<E, V>, BoxError>>;

enum Entry<E, V> {
    Fixed(Action<E, V>),
    Computed(Resolver<E, V>),
}

impl<E, V: Clone> Clone for Entry<E, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(action) => Self::Fixed(action.clone()),
            Self::Computed(resolver) => Self::Computed(Rc::clone(resolver)),
        }
    }
}

/// Mapping from event to action.
///
/// The table mutates through `&self` so that it can be edited while the
/// owning state is shared or current. It must not be edited from inside a
/// running `fire` on a machine that is currently resolving against it.
///
/// Entries hold strong handles to their target states. Self-loops and
/// cycles between states therefore keep every state on the cycle alive
/// until the tables involved are cleared.
pub struct ActionTable<E, V> {
    entries: RefCell<HashMap<E, Entry<E, V>>>,
}

impl<E, V> ActionTable<E, V> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop every entry, releasing the states they point at.
    ///
    /// This is how a graph of states that reference each other is freed
    /// once its machine has been closed.
    pub fn clear(&self) {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        drop(entries);
    }
}

impl<E: Eq + Hash, V> ActionTable<E, V> {
    /// Map `event` to a fixed action, replacing any previous entry.
    pub fn insert(&self, event: E, action: Action<E, V>) {
        self.entries.borrow_mut().insert(event, Entry::Fixed(action));
    }

    /// Map `event` to an action computed at resolution time.
    ///
    /// A resolver error is an interceptable failure, handled exactly like
    /// an unhandled event.
    pub fn insert_with<F>(&self, event: E, resolver: F)
    where
        F: Fn(&E) -> Result<Action<E, V>, BoxError> + 'static,
    {
        self.entries
            .borrow_mut()
            .insert(event, Entry::Computed(Rc::new(resolver)));
    }

    /// Remove the entry for `event`, returning whether one existed.
    pub fn remove(&self, event: &E) -> bool {
        self.entries.borrow_mut().remove(event).is_some()
    }

    pub fn contains(&self, event: &E) -> bool {
        self.entries.borrow().contains_key(event)
    }

    /// The set of events this table handles.
    pub fn events(&self) -> HashSet<E>
    where
        E: Clone,
    {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Look up `event`, running its resolver if the entry is computed.
    ///
    /// Returns `None` if the table has no entry for the event. The table is
    /// not borrowed while a resolver runs, so resolvers may edit it.
    pub fn resolve(&self, event: &E) -> Option<Result<Action<E, V>, BoxError>>
    where
        V: Clone,
    {
        let entry = self.entries.borrow().get(event).cloned();
        entry.map(|entry| match entry {
            Entry::Fixed(action) => Ok(action),
            Entry::Computed(resolver) => resolver(event),
        })
    }
}

impl<E, V> Default for ActionTable<E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Debug, V> Debug for ActionTable<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.borrow().keys()).finish()
    }
}
