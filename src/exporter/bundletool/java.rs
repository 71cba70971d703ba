//! Java runtime discovery.
//!
//! bundletool ships as a jar, so a `java` executable must be on `PATH`.

use crate::exporter::error::{Error, Result};
use std::path::PathBuf;

/// Locate the `java` executable.
pub fn locate_java() -> Result<PathBuf> {
    match which::which("java") {
        Ok(path) => {
            log::debug!("Found java at: {}", path.display());
            Ok(path)
        }
        Err(e) => Err(Error::GenericError(format!(
            "java not found in PATH ({e}). bundletool requires a Java runtime"
        ))),
    }
}
