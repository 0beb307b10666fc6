//! Runs one trainer process and extracts its terminal score.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::invocation::Invocation;

/// The default terminal-value policy: the candidate line, parsed as a
/// decimal float.
///
/// Kept as a standalone function so the parsing policy is testable without
/// any process plumbing.
#[must_use]
pub fn parse_final_score(line: &str) -> Option<f64> {
    line.parse().ok()
}

/// Launches a single trainer process and turns its output stream into a
/// score.
///
/// The child's standard output and standard input are connected as pipes.
/// Output lines are consumed as they arrive and forwarded verbatim to the
/// log, prefixed with the process id, so long-running trainings stay
/// visible. The last non-empty line seen before end-of-stream is the
/// candidate result; the extractor policy (default:
/// [`parse_final_score`]) turns it into a value.
///
/// The child's exit status is not consulted: success is decided solely by
/// whether a parseable final line was produced before the stream closed.
#[derive(Clone)]
pub struct ProcessRunner {
    extract: Arc<dyn Fn(&str) -> Option<f64> + Send + Sync>,
}

impl ProcessRunner {
    /// Creates a runner with the default extractor policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_extractor(parse_final_score)
    }

    /// Creates a runner with a custom terminal-value extractor.
    ///
    /// The extractor receives the last non-empty (trimmed) output line and
    /// returns the score, or `None` if the line does not carry one.
    pub fn with_extractor(extract: impl Fn(&str) -> Option<f64> + Send + Sync + 'static) -> Self {
        Self {
            extract: Arc::new(extract),
        }
    }

    /// Runs the invocation to completion and returns its score.
    ///
    /// # Errors
    ///
    /// - [`Spawn`](Error::Spawn) if the process cannot be started.
    /// - [`ProcessStream`](Error::ProcessStream) if reading stdout fails.
    /// - [`MalformedOutput`](Error::MalformedOutput) if no output line was
    ///   produced or the extractor rejects the last one. The raw line is
    ///   carried along so a diverged model's output shows up in the study
    ///   log.
    pub async fn run(&self, invocation: &Invocation) -> Result<f64> {
        let mut child = Command::new(invocation.program())
            .args(invocation.args())
            .stdout(Stdio::piped())
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Spawn {
                program: invocation.program().to_string(),
                source: e,
            })?;

        let pid = child.id().unwrap_or_default();
        let stdout = child
            .stdout
            .take()
            .ok_or(Error::Internal("child stdout was not piped"))?;
        let mut lines = BufReader::new(stdout).lines();

        let mut last: Option<String> = None;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    tracing::info!(target: "tuner::trainer", "[{pid:03}]: {line}");
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        last = Some(trimmed.to_string());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    return Err(Error::ProcessStream { pid, source: e });
                }
            }
        }

        // Reap the child; its exit status does not decide success.
        let _ = child.wait().await;

        match last.as_deref().and_then(|line| (self.extract)(line)) {
            Some(value) => Ok(value),
            None => Err(Error::MalformedOutput { pid, raw: last }),
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}
