//! External sync trigger.
//!
//! The migration process that re-ingests memories into the vector store is run as a
//! child process. Its combined output is returned line by line; the last line is the
//! summary.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::{expand_tilde, SyncConfig};
use crate::error::{MemoryError, MemoryResult};

/// Summary reported when the process printed nothing.
pub const UNKNOWN_SUMMARY: &str = "Unknown";

/// What one sync run printed and whether it exited cleanly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub success: bool,
    pub output: Vec<String>,
    pub summary: String,
}

/// Something that can bring the vector store up to date with the memory sources.
#[async_trait]
pub trait SyncTrigger: Send + Sync {
    /// Run once and report. Failing to start or finish in time is a `Downstream` error;
    /// a non-zero exit is reported through `success: false`.
    async fn run_sync(&self) -> MemoryResult<SyncOutcome>;
}

/// Runs `program args...` with a deadline.
#[derive(Debug, Clone)]
pub struct ScriptSync {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ScriptSync {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// `program <script> args...`, with `~` expanded in the script path.
    pub fn from_config(config: &SyncConfig) -> Self {
        let mut args = vec![expand_tilde(&config.script).to_string_lossy().into_owned()];
        args.extend(config.args.iter().cloned());
        Self::new(
            expand_tilde(&config.program),
            args,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl SyncTrigger for ScriptSync {
    async fn run_sync(&self) -> MemoryResult<SyncOutcome> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::info!(program = %self.program.display(), args = ?self.args, "starting sync");
        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(MemoryError::downstream(format!(
                    "failed to start sync process {}: {e}",
                    self.program.display()
                )))
            }
            Err(_) => {
                return Err(MemoryError::downstream(format!(
                    "sync timed out after {} seconds",
                    self.timeout.as_secs()
                )))
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let (lines, summary) = summarize_output(&combined);

        let success = output.status.success();
        if success {
            tracing::info!(summary = %summary, "sync finished");
        } else {
            tracing::warn!(status = %output.status, summary = %summary, "sync exited non-zero");
        }

        Ok(SyncOutcome {
            success,
            output: lines,
            summary,
        })
    }
}

/// Trim, split on newlines, and take the last line as the summary.
///
/// Blank output yields no lines and the [`UNKNOWN_SUMMARY`] summary, not a single empty
/// line with an empty summary.
pub fn summarize_output(output: &str) -> (Vec<String>, String) {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return (Vec::new(), UNKNOWN_SUMMARY.to_string());
    }
    let lines: Vec<String> = trimmed.split('\n').map(str::to_string).collect();
    let summary = lines.last().cloned().unwrap_or_else(|| UNKNOWN_SUMMARY.to_string());
    (lines, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str, secs: u64) -> ScriptSync {
        ScriptSync::new("sh", vec!["-c".into(), script.into()], Duration::from_secs(secs))
    }

    #[test]
    fn summary_is_last_line() {
        let (lines, summary) = summarize_output("\n  scanning\nsynced 12 memories\n\n");
        assert_eq!(lines, vec!["scanning", "synced 12 memories"]);
        assert_eq!(summary, "synced 12 memories");
    }

    #[test]
    fn empty_output_is_unknown() {
        let (lines, summary) = summarize_output("  \n ");
        assert!(lines.is_empty());
        assert_eq!(summary, UNKNOWN_SUMMARY);
    }

    #[test]
    fn from_config_puts_script_before_args() {
        let config = SyncConfig {
            program: "python3".into(),
            script: "/opt/migrate.py".into(),
            args: vec!["--sync".into()],
            timeout_secs: 5,
        };
        let sync = ScriptSync::from_config(&config);
        assert_eq!(sync.program, PathBuf::from("python3"));
        assert_eq!(sync.args, vec!["/opt/migrate.py", "--sync"]);
        assert_eq!(sync.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn successful_run_combines_stdout_then_stderr() {
        let outcome = shell("echo one; echo two >&2", 10).run_sync().await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.output, vec!["one", "two"]);
        assert_eq!(outcome.summary, "two");
    }

    #[tokio::test]
    async fn non_zero_exit_reports_failure() {
        let outcome = shell("echo boom; exit 3", 10).run_sync().await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.summary, "boom");
    }

    #[tokio::test]
    async fn silent_run_has_unknown_summary() {
        let outcome = shell("true", 10).run_sync().await.unwrap();
        assert!(outcome.success);
        assert!(outcome.output.is_empty());
        assert_eq!(outcome.summary, UNKNOWN_SUMMARY);
    }

    #[tokio::test]
    async fn missing_program_is_downstream() {
        let sync = ScriptSync::new("/nonexistent/memscope-sync", vec![], Duration::from_secs(5));
        let err = sync.run_sync().await.unwrap_err();
        assert!(matches!(err, MemoryError::Downstream(_)));
    }

    #[tokio::test]
    async fn slow_run_times_out() {
        let err = shell("sleep 5", 1).run_sync().await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
