//! States and the enter/exit lifecycle every state shares.
//!
//! A state is a node of the automaton: an optional label, an optional
//! output value (for Moore machines) and a table of actions keyed by event.
//! States are shared between machines and between other states' tables, so
//! they are handled through [`StateRef`], a reference-counted trait object.

use crate::core::action::ActionTable;
use crate::engine::FsmError;
use std::fmt::{self, Debug};
use std::rc::Rc;

/// Error type returned by caller-supplied hooks and action resolvers.
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Shared handle to a state.
///
/// Action tables hold their targets through this handle, so a state whose
/// table points back at itself (directly or through other states) keeps
/// itself alive. Clear the tables with [`ActionTable::clear`] once the
/// machine is closed to release such a graph.
pub type StateRef<E, V> = Rc<dyn State<E, V>>;

/// Outcome of a state's `enter` hook.
pub enum Entered<E, V> {
    /// The state itself becomes current.
    Current,
    /// Another state becomes current in its place (e.g. lazy initialisation).
    Replaced(StateRef<E, V>),
}

/// Data carried by every state: label, output value and action table.
///
/// `StateNode` is itself a [`State`] with the default lifecycle, which is
/// what most machines need. States with custom `enter`/`exit` behaviour
/// embed a node and implement [`State::node`] to expose it.
///
/// # Example
///
/// ```rust
/// use statemach::core::{MooreAction, State, StateNode};
/// use std::rc::Rc;
///
/// let off = Rc::new(StateNode::<&str, bool>::with_value("off", false));
/// let on = Rc::new(StateNode::<&str, bool>::with_value("on", true));
///
/// off.actions().insert("toggle", on.action());
/// on.actions().insert("toggle", off.action());
///
/// assert_eq!(on.ident(), Some("on"));
/// assert_eq!(on.value(), Some(&true));
/// assert!(off.actions().contains(&"toggle"));
/// ```
pub struct StateNode<E, V> {
    pub(crate) ident: Option<String>,
    pub(crate) value: Option<V>,
    pub(crate) actions: ActionTable<E, V>,
}

impl<E, V> StateNode<E, V> {
    /// An anonymous state with no value and an empty action table.
    pub fn new() -> Self {
        Self {
            ident: None,
            value: None,
            actions: ActionTable::new(),
        }
    }

    /// A labelled state with no value.
    pub fn named(ident: impl Into<String>) -> Self {
        Self {
            ident: Some(ident.into()),
            ..Self::new()
        }
    }

    /// A labelled state carrying a fixed output value (Moore semantics).
    pub fn with_value(ident: impl Into<String>, value: V) -> Self {
        Self {
            ident: Some(ident.into()),
            value: Some(value),
            actions: ActionTable::new(),
        }
    }
}

impl<E, V> Default for StateNode<E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Debug, V: Debug> Debug for StateNode<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("ident", &self.ident)
            .field("value", &self.value)
            .field("actions", &self.actions)
            .finish()
    }
}

impl<E, V: Debug> fmt::Display for StateNode<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateNode(ident={:?}, value={:?})", self.ident, self.value)
    }
}

/// Trait implemented by everything a machine can make current.
///
/// Only [`node`](State::node) is required. The lifecycle hooks default to
/// doing nothing: `enter` keeps the state itself and `exit` does not handle
/// a failure.
///
/// # Lifecycle contract
///
/// - `enter` runs once, immediately before the state becomes current.
/// - `exit` runs once when the state stops being current, for any reason.
///   With no failure in flight the returned flag is ignored. With a failure
///   in flight, returning `true` consumes it: the machine stays in this
///   state and the event's output is `None`. Returning `false` lets the
///   failure reach the caller and the machine terminates.
pub trait State<E, V> {
    /// The label, value and action table of this state.
    fn node(&self) -> &StateNode<E, V>;

    fn ident<'a>(&'a self) -> Option<&'a str>
    where
        E: 'a,
        V: 'a,
    {
        self.node().ident.as_deref()
    }

    fn value<'a>(&'a self) -> Option<&'a V>
    where
        E: 'a,
        V: 'a,
    {
        self.node().value.as_ref()
    }

    fn actions(&self) -> &ActionTable<E, V> {
        &self.node().actions
    }

    /// Called immediately before the state becomes current.
    fn enter(&self) -> Result<Entered<E, V>, BoxError> {
        Ok(Entered::Current)
    }

    /// Called when the state stops being current.
    ///
    /// `failure` is the interceptable failure in flight, if any.
    fn exit(&self, failure: Option<&FsmError>) -> Result<bool, BoxError> {
        let _ = failure;
        Ok(false)
    }
}

impl<E, V> State<E, V> for StateNode<E, V> {
    fn node(&self) -> &StateNode<E, V> {
        self
    }
}

/// Whether two handles point at the same state object.
pub fn same_state<E, V>(a: &StateRef<E, V>, b: &StateRef<E, V>) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a).cast::<()>(),
        Rc::as_ptr(b).cast::<()>(),
    )
}

/// Label used in logs and error messages.
pub(crate) fn label<E, V, S>(state: &S) -> String
where
    S: State<E, V> + ?Sized,
{
    state.ident().unwrap_or("<unnamed>").to_string()
}
