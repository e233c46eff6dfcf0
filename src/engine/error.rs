//! Failures raised while driving a machine.

use crate::core::BoxError;
use std::fmt;
use thiserror::Error;

/// Which lifecycle hook raised a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    Enter,
    Exit,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => f.write_str("enter"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

/// Broad classification of failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Construction without an initial state
    InvalidArgument,
    /// Event not handled by the current state or the machine defaults
    UnhandledEvent,
    /// A computed action failed during resolution
    UserActionFailure,
    /// An `enter` or `exit` hook failed
    LifecycleFailure,
    /// The set of handled events changed across a transition
    InvariantViolation,
    /// The machine was terminated by an earlier failure or closed
    Terminated,
}

/// Errors that can occur while firing events or closing a machine.
#[derive(Debug, Error)]
pub enum FsmError {
    #[error("Event {event} is not handled by state '{state}' or by the machine")]
    UnhandledEvent { event: String, state: String },

    #[error("Action for event {event} in state '{state}' failed: {source}")]
    Action {
        event: String,
        state: String,
        source: BoxError,
    },

    #[error("The {hook} hook of state '{state}' failed: {source}")]
    Lifecycle {
        hook: Hook,
        state: String,
        source: BoxError,
    },

    #[error("Set of current events handled, {before:?}, not the same as set of new events, {after:?}")]
    InvariantViolation {
        before: Vec<String>,
        after: Vec<String>,
    },

    #[error("Machine has terminated and cannot fire further events")]
    Terminated,
}

impl FsmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnhandledEvent { .. } => ErrorKind::UnhandledEvent,
            Self::Action { .. } => ErrorKind::UserActionFailure,
            Self::Lifecycle { .. } => ErrorKind::LifecycleFailure,
            Self::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            Self::Terminated => ErrorKind::Terminated,
        }
    }
}
