//! Driving machines: event resolution, transitions and scoped lifecycles.
//!
//! # Key Concepts
//!
//! - **Machine**: holds the current state and default actions, and fires events
//! - **Interception**: resolution failures are offered to the current state's
//!   `exit`, which may consume them
//! - **Event-set check**: a transition must not change the set of handled events
//! - **Scopes**: `Session` and `scoped` pair every enter with exactly one exit

mod error;
mod machine;
mod scope;

pub use error::{ErrorKind, FsmError, Hook};
pub use machine::Machine;
pub use scope::{scoped, Session};
