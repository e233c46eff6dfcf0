//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder and a table-filling macro so that
//! machines can be assembled without repeating `insert` calls.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::MachineBuilder;
