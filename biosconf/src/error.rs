//! Fatal error taxonomy.
//!
//! These abort the whole run. They travel inside `anyhow::Error` like every
//! other failure and are recovered with `downcast_ref` where the exit code is
//! chosen. Per-setting failures are not errors; they are
//! [`Outcome`](crate::core::types::Outcome) values.

use thiserror::Error;

use crate::exit_codes;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FatalError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("authentication error: {0}")]
    Authentication(String),
}

impl FatalError {
    pub fn exit_code(&self) -> i32 {
        match self {
            FatalError::Configuration(_) => exit_codes::CONFIGURATION,
            FatalError::Connection(_) => exit_codes::CONNECTION,
            FatalError::Authentication(_) => exit_codes::AUTHENTICATION,
        }
    }
}

/// Map any run error to a process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<FatalError>())
        .map_or(exit_codes::FAILURE, FatalError::exit_code)
}
