//! Statemach: a finite state machine interpreter
//!
//! A machine is assembled from shared states, each holding a table that maps
//! events to actions, plus a table of machine-wide default actions. Firing
//! an event resolves it to an action `(next_state, output)`, runs the exit
//! and enter hooks when the state changes, and returns the output. Outputs
//! may belong to the transition (Mealy) or to the state (Moore).
//!
//! # Core Concepts
//!
//! - **State**: a node with an optional label, value and action table, plus
//!   `enter`/`exit` lifecycle hooks
//! - **Action**: the `(next_state, output)` pair an event resolves to
//! - **Machine**: owns the current state and the default actions, and is
//!   itself a state so machines nest
//! - **Scopes**: every state that is entered is exited exactly once
//!
//! # Example
//!
//! ```rust
//! use statemach::actions;
//! use statemach::core::{State, StateNode};
//! use statemach::engine::Machine;
//! use std::rc::Rc;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Bit {
//!     Zero,
//!     One,
//! }
//!
//! // Rising/falling edge detector: outputs One whenever the input changes.
//! let s_i = Rc::new(StateNode::<Bit, Bit>::named("i"));
//! let s_0 = Rc::new(StateNode::<Bit, Bit>::named("0"));
//! let s_1 = Rc::new(StateNode::<Bit, Bit>::named("1"));
//!
//! actions!(s_i.actions(), { Bit::Zero => (s_0, Some(Bit::Zero)), Bit::One => (s_1, Some(Bit::Zero)) });
//! actions!(s_0.actions(), { Bit::Zero => (s_0, Some(Bit::Zero)), Bit::One => (s_1, Some(Bit::One)) });
//! actions!(s_1.actions(), { Bit::Zero => (s_0, Some(Bit::One)), Bit::One => (s_1, Some(Bit::Zero)) });
//!
//! let machine = Machine::<Bit, Bit>::new(s_i);
//! let session = machine.open();
//! assert_eq!(session.fire(&Bit::Zero).unwrap(), Some(Bit::Zero));
//! assert_eq!(session.fire(&Bit::One).unwrap(), Some(Bit::One));
//! assert_eq!(session.fire(&Bit::One).unwrap(), Some(Bit::Zero));
//! assert_eq!(session.state().unwrap().ident(), Some("1"));
//! ```

pub mod builder;
pub mod core;
pub mod engine;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use self::core::{Action, ActionTable, Entered, MooreAction, State, StateNode, StateRef};
pub use engine::{scoped, ErrorKind, FsmError, Machine, Session};
