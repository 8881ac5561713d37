// Command Executor - hands a built script to the automation environment.
//
// The runner is injected into `NotesClient` so tests can stand in for Notes.app.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::NotesError;
use crate::script::NotesScript;

pub const DEFAULT_OSASCRIPT: &str = "/usr/bin/osascript";

/// Raw result of running a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ScriptOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && self.stderr.is_empty()
    }

    /// Stdout on success; otherwise the host's error text, unparsed.
    pub fn into_stdout(self) -> Result<String, NotesError> {
        if self.success() {
            Ok(self.stdout)
        } else if !self.stderr.is_empty() {
            Err(NotesError::HostExecution(self.stderr))
        } else {
            Err(NotesError::HostExecution(format!(
                "osascript exited with status {}",
                self.exit_code
            )))
        }
    }
}

#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &NotesScript) -> Result<ScriptOutput, NotesError>;
}

/// Runs scripts through `osascript`, one process per call.
#[derive(Debug, Clone)]
pub struct OsaScriptRunner {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Default for OsaScriptRunner {
    fn default() -> Self {
        Self::new(DEFAULT_OSASCRIPT, None)
    }
}

impl OsaScriptRunner {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ScriptRunner for OsaScriptRunner {
    async fn run(&self, script: &NotesScript) -> Result<ScriptOutput, NotesError> {
        debug!(
            operation = script.operation().name(),
            program = %self.program.display(),
            "running AppleScript"
        );
        run_program(&self.program, script.source(), self.timeout).await
    }
}

/// Feed `source` to `program` on stdin and collect its output.
async fn run_program(
    program: &Path,
    source: &str,
    timeout: Option<Duration>,
) -> Result<ScriptOutput, NotesError> {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
        NotesError::HostExecution(format!("Failed to spawn {}: {}", program.display(), e))
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(source.as_bytes()).await.map_err(|e| {
            NotesError::HostExecution(format!("Failed to write script: {}", e))
        })?;
    }

    let wait = child.wait_with_output();
    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
            NotesError::Timeout(format!(
                "osascript did not finish within {:.1}s",
                limit.as_secs_f64()
            ))
        })??,
        None => wait.await?,
    };

    Ok(ScriptOutput {
        stdout: strip_line_terminator(String::from_utf8_lossy(&output.stdout).into_owned()),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

// osascript terminates its result with a single newline; anything before it is content.
fn strip_line_terminator(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
    }
    s
}
