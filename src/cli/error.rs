//! CLI-level errors (wraps declaration errors)

use thiserror::Error;

use crate::domain::ConfigError;

/// CLI errors are the top-level error type of the binary.
/// Usage errors never get here: clap prints them and exits.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Declaration(#[from] ConfigError),

    #[error("settings error: {message}")]
    Settings { message: String },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Declaration(_) => crate::exitcode::ERROR,
            CliError::Settings { .. } => crate::exitcode::FAILURE,
        }
    }
}
