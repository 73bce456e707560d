//! External command execution with a wall-clock timeout.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use unitcheck_shared::CheckError;

/// Poll interval while waiting for a child
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} printed non UTF-8 output")]
    NonUtf8 { program: String },

    #[error("{program} exited with {code}: {stderr}")]
    Stderr {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RunError> for CheckError {
    fn from(err: RunError) -> Self {
        CheckError::Acquisition(err.to_string())
    }
}

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub program: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout of a successful run, or the error text of a failed one.
    pub fn into_stdout(self) -> Result<String, RunError> {
        if self.success() {
            return Ok(self.stdout);
        }
        Err(RunError::Stderr {
            program: self.program,
            code: self.exit_code,
            stderr: self.stderr.trim().to_string(),
        })
    }
}

/// Runs external programs. Tests substitute canned output.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, RunError>;
}

/// Runs programs on the local system
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, RunError> {
        debug!("running {} {}", program, args.join(" "));
        let start = Instant::now();

        let mut child = Command::new(program)
            .args(args)
            .env("LANG", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Read both pipes concurrently so a chatty child cannot block on a
        // full pipe while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::Timeout {
                    program: program.to_string(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        debug!(
            "{} finished in {}ms with {:?}",
            program,
            start.elapsed().as_millis(),
            status.code()
        );

        let stdout = String::from_utf8(stdout).map_err(|_| RunError::NonUtf8 {
            program: program.to_string(),
        })?;

        Ok(CommandOutput {
            program: program.to_string(),
            stdout,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: status.code().unwrap_or(-1),
        })
    }
}
