//! Top-level error types for the step binary.

use thiserror::Error;

/// Result type alias for step operations
pub type Result<T> = std::result::Result<T, StepError>;

/// Main error type for a step run
#[derive(Error, Debug)]
pub enum StepError {
    /// CLI argument and host integration errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export pipeline errors
    #[error("Failed to export APK: {0}")]
    Export(#[from] crate::exporter::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}
