//! Terminal lifecycle checks for the binary

use std::path::Path;

/// Fail unless both stdin and stdout are terminals
pub fn require_tty(stdin_tty: bool, stdout_tty: bool, log_file: &Path) -> anyhow::Result<()> {
    if stdin_tty && stdout_tty {
        return Ok(());
    }
    tracing::error!(stdin_tty, stdout_tty, "No terminal available");
    anyhow::bail!(
        "room-tui requires a terminal (TTY); logs: {}",
        log_file.display()
    )
}

/// Combine the app loop result with the terminal restore result
///
/// The loop's error is reported over a restore failure.
pub fn finish(run: anyhow::Result<()>, restore: anyhow::Result<()>) -> anyhow::Result<()> {
    match (run, restore) {
        (Err(run_err), Err(restore_err)) => {
            tracing::warn!(error = %restore_err, "Terminal restore failed after app error");
            Err(run_err)
        }
        (Err(run_err), Ok(())) => Err(run_err),
        (Ok(()), restore) => restore,
    }
}
