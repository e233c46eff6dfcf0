//! Core state machine data: states, actions and transition history.
//!
//! This module holds what a caller authors before driving a machine:
//! - States via the `State` trait and the `StateNode` data they carry
//! - Actions and the mutable `ActionTable` that maps events to them
//! - `History`, an optional record of completed transitions
//!
//! Nothing here drives a machine; see [`crate::engine`] for that.

mod action;
mod history;
mod state;

pub use action::{Action, ActionTable, MooreAction, Resolver};
pub use history::{History, TransitionRecord};
pub use state::{same_state, BoxError, Entered, State, StateNode, StateRef};

pub(crate) use state::label;
