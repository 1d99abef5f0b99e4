//! External tool execution with bounded waits.
//!
//! All transcoder invocations go through [`run_tool`], which captures
//! stdout/stderr, enforces an optional deadline with forced termination,
//! and surfaces the tool's diagnostics verbatim on failure.

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Polling interval while waiting for a child process.
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Error from an external tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool exited with a non-zero code.
    #[error("{tool} failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    /// The tool did not finish before the deadline and was killed.
    #[error("{tool} timed out after {timeout_secs}s and was terminated")]
    TimedOut { tool: String, timeout_secs: u64 },

    /// The tool could not be started.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// I/O error while talking to the tool.
    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Captured output of a successful tool run.
#[derive(Debug)]
pub struct ToolOutput {
    /// Raw stdout bytes (raw PCM for pipe decodes, text otherwise).
    pub stdout: Vec<u8>,
    /// Stderr decoded as text (ffmpeg writes diagnostics here).
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout decoded as text (lossy).
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }
}

/// Run an external tool to completion and require exit code 0.
///
/// Stdout and stderr are drained on dedicated threads so the child can
/// never block on a full pipe while we wait. With a timeout, the child
/// is polled and killed once the deadline passes; without one the wait
/// is unbounded.
pub fn run_tool(
    program: &str,
    tool: &str,
    args: &[String],
    timeout: Option<Duration>,
) -> ToolResult<ToolOutput> {
    tracing::debug!(tool, ?args, "running external tool");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ToolError::Spawn {
            tool: tool.to_string(),
            source: e,
        })?;

    let stdout_handle = spawn_reader(child.stdout.take());
    let stderr_handle = spawn_reader(child.stderr.take());

    let status = wait_with_deadline(&mut child, tool, timeout)?;

    let stdout = join_reader(stdout_handle, tool)?;
    let stderr_bytes = join_reader(stderr_handle, tool)?;
    let stderr = String::from_utf8_lossy(&stderr_bytes).to_string();

    let exit_code = status.code().unwrap_or(-1);
    if !status.success() {
        return Err(ToolError::CommandFailed {
            tool: tool.to_string(),
            exit_code,
            stderr,
        });
    }

    Ok(ToolOutput { stdout, stderr })
}

/// Wait for the child, killing it if the deadline passes.
fn wait_with_deadline(
    child: &mut Child,
    tool: &str,
    timeout: Option<Duration>,
) -> ToolResult<std::process::ExitStatus> {
    let io_err = |e| ToolError::Io {
        tool: tool.to_string(),
        source: e,
    };

    let Some(timeout) = timeout else {
        return child.wait().map_err(io_err);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(io_err)? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            tracing::warn!(tool, timeout_secs = timeout.as_secs(), "tool deadline passed, killing");
            let _ = child.kill();
            let _ = child.wait();
            return Err(ToolError::TimedOut {
                tool: tool.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
        thread::sleep(WAIT_POLL);
    }
}

/// Drain a child pipe on its own thread.
fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> Option<thread::JoinHandle<io::Result<Vec<u8>>>> {
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            reader.read_to_end(&mut buffer)?;
            Ok(buffer)
        })
    })
}

/// Collect a reader thread's output.
fn join_reader(
    handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>,
    tool: &str,
) -> ToolResult<Vec<u8>> {
    match handle {
        None => Ok(Vec::new()),
        Some(handle) => match handle.join() {
            Ok(result) => result.map_err(|e| ToolError::Io {
                tool: tool.to_string(),
                source: e,
            }),
            Err(_) => Err(ToolError::Io {
                tool: tool.to_string(),
                source: io::Error::other("output reader thread panicked"),
            }),
        },
    }
}
