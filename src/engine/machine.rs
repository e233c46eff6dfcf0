//! The machine: resolves events to actions and sequences enter/exit hooks.

use crate::core::{
    label, same_state, Action, ActionTable, BoxError, Entered, History, State, StateNode,
    StateRef, TransitionRecord,
};
use crate::engine::error::{FsmError, Hook};
use crate::engine::scope::Session;
use chrono::Utc;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::rc::Rc;
use tracing::{debug, error, trace};

/// Finite state machine driven one event at a time.
///
/// The machine holds a non-owning handle to its current state plus a table
/// of machine-wide default actions. An event is looked up in the current
/// state's table first and in the defaults second.
///
/// The initial state is entered lazily, on the first [`fire`](Machine::fire),
/// so a machine that is opened and closed without events never enters or
/// exits it.
///
/// A machine is itself a [`State`]: its default table doubles as its action
/// table when it is nested inside another machine, and exiting it exits
/// its own current state.
///
/// # Example
///
/// ```rust
/// use statemach::core::{Action, State, StateNode, StateRef};
/// use statemach::engine::Machine;
/// use std::rc::Rc;
///
/// let idle: StateRef<&str, u32> = Rc::new(StateNode::named("idle"));
/// let busy: StateRef<&str, u32> = Rc::new(StateNode::named("busy"));
/// idle.actions().insert("work", Action::new(Rc::clone(&busy), Some(1)));
/// busy.actions().insert("work", Action::new(Rc::clone(&busy), Some(2)));
///
/// let machine = Machine::new(Rc::clone(&idle));
/// machine.actions().insert("rest", Action::new(Rc::clone(&idle), Some(0)));
///
/// let session = machine.open();
/// assert_eq!(session.fire(&"work").unwrap(), Some(1));
/// assert_eq!(session.fire(&"work").unwrap(), Some(2));
/// assert_eq!(session.fire(&"rest").unwrap(), Some(0));
/// session.close().unwrap();
/// ```
pub struct Machine<E, V> {
    node: StateNode<E, V>,
    current: RefCell<Option<StateRef<E, V>>>,
    entered: Cell<bool>,
    poisoned: Cell<bool>,
    history: Option<RefCell<History>>,
}

impl<E, V> Machine<E, V>
where
    E: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    /// Create a machine whose first event is fired from `initial`.
    ///
    /// The initial state's `enter` hook does not run here.
    pub fn new(initial: StateRef<E, V>) -> Self {
        Self::from_parts(StateNode::new(), initial, false)
    }

    pub(crate) fn from_parts(node: StateNode<E, V>, initial: StateRef<E, V>, record: bool) -> Self {
        Self {
            node,
            current: RefCell::new(Some(initial)),
            entered: Cell::new(false),
            poisoned: Cell::new(false),
            history: record.then(|| RefCell::new(History::new())),
        }
    }

    /// Current state, `None` once the machine has been closed or terminated
    /// by a propagated failure.
    pub fn state(&self) -> Option<StateRef<E, V>> {
        self.current.borrow().clone()
    }

    /// Machine-wide default actions.
    pub fn actions(&self) -> &ActionTable<E, V> {
        &self.node.actions
    }

    /// Events handled by the machine defaults or the current state.
    pub fn events(&self) -> Result<HashSet<E>, FsmError> {
        let current = self.current_state()?;
        Ok(self.events_of(&current))
    }

    /// Whether `fire` can no longer be used.
    pub fn is_terminated(&self) -> bool {
        self.poisoned.get() || self.current.borrow().is_none()
    }

    /// Recorded transitions, if the machine was built with history enabled.
    pub fn history(&self) -> Option<History> {
        self.history.as_ref().map(|h| h.borrow().clone())
    }

    /// Open a scope around this machine; closing the scope exits the
    /// current state.
    pub fn open(&self) -> Session<'_, E, V> {
        Session::new(self)
    }

    /// Fire `event` and return the output of the resolved action.
    ///
    /// # Errors
    ///
    /// - `UnhandledEvent` / `Action` when resolution fails and the current
    ///   state's `exit` does not consume the failure. The machine terminates.
    /// - `Lifecycle` when an `enter` or `exit` hook fails.
    /// - `InvariantViolation` when the new state handles a different set of
    ///   events than the old one. The machine is poisoned.
    /// - `Terminated` when an earlier failure already ended the machine.
    pub fn fire(&self, event: &E) -> Result<Option<V>, FsmError> {
        if self.poisoned.get() {
            return Err(FsmError::Terminated);
        }
        let mut current = self.current_state()?;

        if !self.entered.replace(true) {
            debug!(state = %label(&*current), "entering initial state");
            current = enter_state(&current)?;
            *self.current.borrow_mut() = Some(Rc::clone(&current));
        }

        let before = self.events_of(&current);
        let action = match self.resolve(&current, event) {
            Ok(action) => action,
            Err(failure) => self.intercept(&current, failure)?,
        };

        if same_state(&action.next, &current) {
            trace!(state = %label(&*current), ?event, "no transition");
            return Ok(action.output);
        }

        self.transition(&current, &action.next, event, &before)?;
        Ok(action.output)
    }

    /// Exit the current state if it was ever entered and release it.
    ///
    /// Closing twice, or closing a terminated machine, does nothing.
    pub fn close(&self) -> Result<(), FsmError> {
        let current = self.current.borrow_mut().take();
        match current {
            Some(state) if self.entered.get() => {
                debug!(state = %label(&*state), "closing machine");
                exit_state(&state, None).map(|_| ())
            }
            _ => Ok(()),
        }
    }

    fn current_state(&self) -> Result<StateRef<E, V>, FsmError> {
        self.current.borrow().clone().ok_or(FsmError::Terminated)
    }

    fn events_of(&self, state: &StateRef<E, V>) -> HashSet<E> {
        let mut events = self.node.actions.events();
        events.extend(state.actions().events());
        events
    }

    /// State table first, then machine defaults.
    fn resolve(&self, current: &StateRef<E, V>, event: &E) -> Result<Action<E, V>, FsmError> {
        let found = current
            .actions()
            .resolve(event)
            .or_else(|| self.node.actions.resolve(event));

        match found {
            Some(Ok(action)) => Ok(action),
            Some(Err(source)) => Err(FsmError::Action {
                event: format!("{event:?}"),
                state: label(&**current),
                source,
            }),
            None => Err(FsmError::UnhandledEvent {
                event: format!("{event:?}"),
                state: label(&**current),
            }),
        }
    }

    /// Offer a resolution failure to the current state's `exit`.
    fn intercept(&self, current: &StateRef<E, V>, failure: FsmError) -> Result<Action<E, V>, FsmError> {
        match exit_state(current, Some(&failure)) {
            Ok(true) => {
                debug!(state = %label(&**current), error = %failure, "failure handled by state exit");
                Ok(Action::new(Rc::clone(current), None))
            }
            Ok(false) => {
                *self.current.borrow_mut() = None;
                Err(failure)
            }
            Err(err) => {
                *self.current.borrow_mut() = None;
                Err(err)
            }
        }
    }

    fn transition(
        &self,
        from: &StateRef<E, V>,
        to: &StateRef<E, V>,
        event: &E,
        before: &HashSet<E>,
    ) -> Result<(), FsmError> {
        debug!(from = %label(&**from), to = %label(&**to), ?event, "transition");

        let entered = exit_state(from, None).and_then(|_| enter_state(to));
        let entered = match entered {
            Ok(state) => state,
            Err(err) => {
                *self.current.borrow_mut() = None;
                return Err(err);
            }
        };
        *self.current.borrow_mut() = Some(Rc::clone(&entered));

        if let Some(history) = &self.history {
            history.borrow_mut().record(TransitionRecord {
                from: label(&**from),
                to: label(&*entered),
                event: format!("{event:?}"),
                timestamp: Utc::now(),
            });
        }

        let after = self.events_of(&entered);
        if after != *before {
            self.poisoned.set(true);
            let err = FsmError::InvariantViolation {
                before: render(before),
                after: render(&after),
            };
            error!(from = %label(&**from), to = %label(&*entered), error = %err, "event set changed");
            return Err(err);
        }
        Ok(())
    }
}

impl<E, V> State<E, V> for Machine<E, V>
where
    E: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    fn node(&self) -> &StateNode<E, V> {
        &self.node
    }

    /// Exits the inner current state exactly once; never consumes a failure.
    fn exit(&self, _failure: Option<&FsmError>) -> Result<bool, BoxError> {
        self.close()?;
        Ok(false)
    }
}

impl<E, V> fmt::Display for Machine<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current.borrow().as_ref() {
            Some(state) => write!(f, "Machine(state={})", label(&**state)),
            None => f.write_str("Machine(state=<terminated>)"),
        }
    }
}

fn enter_state<E, V>(state: &StateRef<E, V>) -> Result<StateRef<E, V>, FsmError> {
    match state.enter() {
        Ok(Entered::Current) => Ok(Rc::clone(state)),
        Ok(Entered::Replaced(replacement)) => Ok(replacement),
        Err(source) => Err(FsmError::Lifecycle {
            hook: Hook::Enter,
            state: label(&**state),
            source,
        }),
    }
}

fn exit_state<E, V>(state: &StateRef<E, V>, failure: Option<&FsmError>) -> Result<bool, FsmError> {
    state.exit(failure).map_err(|source| FsmError::Lifecycle {
        hook: Hook::Exit,
        state: label(&**state),
        source,
    })
}

fn render<E: Debug>(events: &HashSet<E>) -> Vec<String> {
    let mut names: Vec<String> = events.iter().map(|e| format!("{e:?}")).collect();
    names.sort();
    names
}
