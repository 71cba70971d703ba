//! External command execution with captured output.

use crate::exporter::error::{Error, Result};
use std::{process::Stdio, time::Duration};
use tokio::process::Command;

/// Flags whose following argument must not appear in logs or errors.
const SECRET_FLAGS: &[&str] = &["--ks-pass", "--key-pass"];

/// Renders a command line for logs and error messages, with password
/// arguments masked.
pub fn printable(cmd: &Command) -> String {
    let std_cmd = cmd.as_std();
    let mut parts = vec![quote(&std_cmd.get_program().to_string_lossy())];
    let mut mask_next = false;
    for arg in std_cmd.get_args() {
        let arg = arg.to_string_lossy();
        if mask_next {
            parts.push("<redacted>".to_string());
        } else {
            parts.push(quote(&arg));
        }
        mask_next = SECRET_FLAGS.contains(&&*arg);
    }
    parts.join(" ")
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains('"') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// Runs `cmd` to completion, capturing stdout and stderr.
///
/// Success is defined by the exit status alone. On failure the error carries
/// the printable command, the exit code when there is one, and the trimmed
/// combined output when it is not empty. With a `timeout` the child is
/// killed once the limit passes.
pub async fn run_command(mut cmd: Command, timeout: Option<Duration>) -> Result<()> {
    let command = printable(&cmd);
    log::debug!("Running: {}", command);

    cmd.stdin(Stdio::null()).kill_on_drop(true);
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, cmd.output())
            .await
            .map_err(|_| Error::Timeout {
                command: command.clone(),
                timeout: limit,
            })?,
        None => cmd.output().await,
    }
    .map_err(|error| Error::CommandFailed {
        command: program,
        error,
    })?;

    if output.status.success() {
        return Ok(());
    }

    let combined = combined_output(&output.stdout, &output.stderr);
    Err(Error::ToolInvocationFailed {
        command,
        status: output.status.code(),
        output: (!combined.is_empty()).then_some(combined),
    })
}

fn combined_output(stdout: &[u8], stderr: &[u8]) -> String {
    [stdout, stderr]
        .iter()
        .map(|stream| String::from_utf8_lossy(stream).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_masks_passwords() {
        let mut cmd = Command::new("java");
        cmd.args([
            "-jar",
            "/tmp/bundletool all.jar",
            "--ks-pass",
            "pass:hunter2",
            "--ks-key-alias",
            "upload",
            "--key-pass",
            "file:/secret",
        ]);

        assert_eq!(
            printable(&cmd),
            "java -jar \"/tmp/bundletool all.jar\" --ks-pass <redacted> --ks-key-alias upload --key-pass <redacted>"
        );
    }

    #[test]
    fn combined_output_skips_empty_streams() {
        assert_eq!(combined_output(b"  \n", b"signing failed\n"), "signing failed");
        assert_eq!(combined_output(b"out\n", b"err\n"), "out\nerr");
        assert_eq!(combined_output(b"", b""), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo ignored; echo also ignored >&2"]);
        run_command(cmd, None).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_carries_status_and_output() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo signing failed >&2; exit 3"]);

        match run_command(cmd, None).await.unwrap_err() {
            Error::ToolInvocationFailed {
                command,
                status,
                output,
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(status, Some(3));
                assert_eq!(output.as_deref(), Some("signing failed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_failure_has_no_output() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exit 1"]);

        match run_command(cmd, None).await.unwrap_err() {
            Error::ToolInvocationFailed { output, .. } => assert!(output.is_none()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 5"]);

        let err = run_command(cmd, Some(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let cmd = Command::new("definitely-not-an-installed-program");
        let err = run_command(cmd, None).await.unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }
}
