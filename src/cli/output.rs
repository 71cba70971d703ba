//! Step output publishing.
//!
//! Outputs go through `envman` when the CI host provides it; otherwise they
//! are printed as `KEY=value` on stdout.

use crate::error::{CliError, Result};
use anyhow::Context;
use std::{
    ffi::OsString,
    io::Write,
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::{io::AsyncWriteExt, process::Command};

/// Publishes `value` under `key`.
pub async fn export_output(key: &str, value: &str) -> Result<()> {
    match locate_envman(std::env::var_os("PATH")) {
        Some(envman) => envman_add(Command::new(envman), key, value).await,
        None => {
            log::debug!("envman not found, printing {} to stdout", key);
            print_output(&mut std::io::stdout().lock(), key, value)
        }
    }
}

/// Finds `envman` on the given search path.
fn locate_envman(paths: Option<OsString>) -> Option<PathBuf> {
    which::which_in("envman", paths, Path::new(".")).ok()
}

/// Runs `<envman> add --key <key>` with `value` on stdin.
async fn envman_add(mut envman: Command, key: &str, value: &str) -> Result<()> {
    let mut child = envman
        .args(["add", "--key", key])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to start envman")?;

    {
        let mut stdin = child.stdin.take().context("envman stdin was not captured")?;
        stdin.write_all(value.as_bytes()).await?;
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        return Err(CliError::ExecutionFailed {
            command: format!("envman add --key {key}"),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    log::debug!("Exported {} via envman", key);
    Ok(())
}

fn print_output(out: &mut impl Write, key: &str, value: &str) -> Result<()> {
    writeln!(out, "{key}={value}")?;
    Ok(())
}
