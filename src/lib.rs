//! Universal APK export for Android App Bundles.
//!
//! This library converts an `.aab` into a signed, installable universal APK
//! by driving Google's bundletool:
//! - downloads bundletool (and remote keystores) with ordered URL fallback
//! - normalises signing input into bundletool's `--ks*` flags
//! - extracts `universal.apk` and places it under a name derived from the bundle
//!
//! It can be used both as a CI step binary and as a library dependency.

pub mod cli;
pub mod error;
pub mod exporter;

// Re-export commonly used types
pub use error::{CliError, Result, StepError};
