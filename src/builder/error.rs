//! Build errors for machine construction.

use crate::engine::ErrorKind;
use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInitialState => ErrorKind::InvalidArgument,
        }
    }
}
