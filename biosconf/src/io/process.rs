//! Bounded child process execution for interface scripts.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// What a finished (or killed) child left behind.
#[derive(Debug)]
pub struct ScriptOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    /// Bytes dropped across both streams once the limit was reached.
    pub truncated: usize,
    pub timed_out: bool,
}

/// Feed `input` to the child's stdin, then wait up to `timeout`.
///
/// stdout and stderr are drained on helper threads while the child runs so a
/// chatty child cannot block on a full pipe. Each stream keeps at most
/// `output_limit_bytes`. A child still running at the deadline is killed and
/// reported with `timed_out`.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), output_limit_bytes))]
pub fn run_with_stdin(
    mut cmd: Command,
    input: &[u8],
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<ScriptOutput> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().context("spawn command")?;
    debug!(pid = child.id(), "child started");

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    let stdout_reader = thread::spawn(move || drain_limited(stdout, output_limit_bytes));
    let stderr_reader = thread::spawn(move || drain_limited(stderr, output_limit_bytes));

    {
        // Closing stdin at the end of this block is the child's signal to run.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;
        if let Err(err) = stdin.write_all(input) {
            drop(stdin);
            reap(&mut child);
            return Err(err).context("write stdin");
        }
    }

    let (status, timed_out) = match child.wait_timeout(timeout).context("wait for child")? {
        Some(status) => (status, false),
        None => {
            warn!(timeout_secs = timeout.as_secs(), "child timed out, killing");
            child.kill().context("kill child")?;
            (child.wait().context("wait child after kill")?, true)
        }
    };

    let (stdout, stdout_dropped) = join_reader(stdout_reader).context("collect stdout")?;
    let (stderr, stderr_dropped) = join_reader(stderr_reader).context("collect stderr")?;
    let truncated = stdout_dropped + stderr_dropped;
    if truncated > 0 {
        warn!(truncated, "child output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "child finished");
    Ok(ScriptOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        truncated,
        timed_out,
    })
}

/// Kill and wait on a child that will not be waited on normally.
fn reap(child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!(err = %err, "kill after failed stdin write");
    }
    match child.wait() {
        Ok(status) => debug!(exit_code = ?status.code(), "child reaped"),
        Err(err) => warn!(err = %err, "failed to reap child"),
    }
}

fn join_reader(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    handle
        .join()
        .map_err(|_| anyhow!("output reader thread panicked"))?
}

/// Read `reader` to the end, keeping the first `limit` bytes.
///
/// Returns the kept bytes and how many were dropped.
fn drain_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut kept = Vec::new();
    let mut dropped = 0usize;
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            return Ok((kept, dropped));
        }
        let room = limit.saturating_sub(kept.len()).min(n);
        kept.extend_from_slice(&chunk[..room]);
        dropped += n - room;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_counts_dropped_bytes() {
        let data = vec![b'x'; 10_000];
        let (kept, dropped) = drain_limited(&data[..], 4096).expect("read");
        assert_eq!(kept.len(), 4096);
        assert_eq!(dropped, 10_000 - 4096);
    }

    #[test]
    fn drain_keeps_short_streams() {
        let (kept, dropped) = drain_limited(&b"Name,Value"[..], 4096).expect("read");
        assert_eq!(kept, b"Name,Value");
        assert_eq!(dropped, 0);
    }

    #[cfg(unix)]
    #[test]
    fn stdin_write_failure_reaps_child() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exec 0<&-; exit 0"]);
        let input = vec![b'x'; 4 * 1024 * 1024];
        match run_with_stdin(cmd, &input, Duration::from_secs(10), 1024) {
            Ok(output) => assert!(output.status.success()),
            Err(err) => assert!(format!("{err:#}").contains("write stdin")),
        }
    }

    #[test]
    fn spawn_failure_is_an_error() {
        let cmd = Command::new("biosconf-no-such-program-xyz");
        let err = run_with_stdin(cmd, b"", Duration::from_secs(5), 1024)
            .expect_err("spawn should fail");
        assert!(format!("{err:#}").contains("spawn command"));
    }
}
