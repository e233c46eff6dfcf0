//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::core::{Action, BoxError, StateNode, StateRef};
use crate::engine::Machine;
use std::fmt::Debug;
use std::hash::Hash;

/// Builder for constructing machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use statemach::builder::MachineBuilder;
/// use statemach::core::{Action, State, StateNode, StateRef};
/// use std::rc::Rc;
///
/// let idle: StateRef<u8, &str> = Rc::new(StateNode::named("idle"));
///
/// let machine = MachineBuilder::new()
///     .ident("worker")
///     .initial(Rc::clone(&idle))
///     .action(0, Action::new(Rc::clone(&idle), Some("reset")))
///     .record_history(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.fire(&0).unwrap(), Some("reset"));
/// assert_eq!(machine.ident(), Some("worker"));
/// ```
pub struct MachineBuilder<E, V> {
    initial: Option<StateRef<E, V>>,
    node: StateNode<E, V>,
    record_history: bool,
}

impl<E, V> MachineBuilder<E, V>
where
    E: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            node: StateNode::new(),
            record_history: false,
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: StateRef<E, V>) -> Self {
        self.initial = Some(state);
        self
    }

    /// Label the machine, used when it is nested inside another machine.
    pub fn ident(mut self, ident: impl Into<String>) -> Self {
        self.node.ident = Some(ident.into());
        self
    }

    /// Add a machine-wide default action.
    pub fn action(self, event: E, action: Action<E, V>) -> Self {
        self.node.actions.insert(event, action);
        self
    }

    /// Add a machine-wide default action computed when the event fires.
    pub fn action_with<F>(self, event: E, resolver: F) -> Self
    where
        F: Fn(&E) -> Result<Action<E, V>, BoxError> + 'static,
    {
        self.node.actions.insert_with(event, resolver);
        self
    }

    /// Record every completed transition (off by default).
    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    /// Build the machine.
    /// Returns an error if no initial state was given.
    pub fn build(self) -> Result<Machine<E, V>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        Ok(Machine::from_parts(self.node, initial, self.record_history))
    }
}

impl<E, V> Default for MachineBuilder<E, V>
where
    E: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
