//! Error types for the export pipeline.
//!
//! Every step returns [`Error`] and the orchestrator propagates the first one
//! it sees. [`ErrorExt`] attaches the operation and path to raw I/O errors,
//! [`Context`] wraps any error (or a missing value) with a message.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error as DeriveError;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while fetching, signing, building and placing the APK.
#[derive(Debug, DeriveError)]
pub enum Error {
    /// Every candidate URL for an artifact failed.
    #[error(
        "none of the sources returned a successful response for {artifact}: {}",
        attempts.join("; ")
    )]
    FetchExhausted {
        /// Artifact being fetched (e.g. `bundletool-all.jar`)
        artifact: String,
        /// One `<url>: <reason>` line per failed candidate, in order
        attempts: Vec<String>,
    },

    /// The external packaging command exited unsuccessfully.
    #[error("{}", describe_tool_failure(command, *status, output.as_deref()))]
    ToolInvocationFailed {
        /// Printable command line
        command: String,
        /// Exit code, absent when the process was terminated by a signal
        status: Option<i32>,
        /// Captured combined output, absent when empty
        output: Option<String>,
    },

    /// A file the external tool guarantees to produce was not there.
    #[error("expected output not found: {}", path.display())]
    MissingExpectedOutput {
        /// Path that should have existed
        path: PathBuf,
    },

    /// Filesystem operation failed on a specific path.
    #[error("{context} ({}): {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: std::io::Error,
    },

    /// External command could not be started.
    #[error("failed to run {command}: {error}")]
    CommandFailed {
        /// Program name
        command: String,
        /// Spawn error
        error: std::io::Error,
    },

    /// External command did not finish in time and was killed.
    #[error("{command} timed out after {}s", timeout.as_secs())]
    Timeout {
        /// Printable command line
        command: String,
        /// Configured limit
        timeout: Duration,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    GenericError(String),

    #[error("{0}: {1}")]
    Context(String, Box<Error>),
}

/// Formats a tool failure as `<cmd> failed (status: <code>): <output>`.
fn describe_tool_failure(command: &str, status: Option<i32>, output: Option<&str>) -> String {
    let mut msg = format!("{command} failed");
    if let Some(code) = status {
        msg.push_str(&format!(" (status: {code})"));
    }
    if let Some(out) = output.filter(|o| !o.is_empty()) {
        msg.push_str(&format!(": {out}"));
    }
    msg
}

/// Adds a message to an error or a missing value.
pub trait Context<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: Into<Error>> Context<T> for std::result::Result<T, E> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e.into())))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e.into())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Attaches the operation and path to an I/O error.
pub trait ErrorExt<T> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Returns early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::exporter::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::exporter::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
