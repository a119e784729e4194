//! Strict validation through an external checker binary.
//!
//! The rendered document is staged into a uniquely named scratch file and
//! handed to the checker (`mihomo -t -f <path>`), which parses it exactly as
//! the runtime client would. The scratch file is removed on every exit path:
//! pass, fail, spawn error or timeout. A missing binary is a distinct
//! condition from a rejected document.

use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::ConvertError;

pub const DEFAULT_VALIDATOR_BIN: &str = "mihomo";

pub const DEFAULT_VALIDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runner for the external strict checker
pub struct Validator {
    binary: String,
    timeout: Duration,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDATOR_BIN, DEFAULT_VALIDATE_TIMEOUT)
    }
}

impl Validator {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Strict-check a rendered document.
    ///
    /// Returns `Ok(())` only when the checker exits zero. A non-zero exit
    /// becomes [`ConvertError::Validation`] carrying the tool's combined
    /// stdout/stderr verbatim; a binary that cannot be spawned becomes
    /// [`ConvertError::ToolUnavailable`].
    pub async fn validate(&self, document: &str) -> Result<(), ConvertError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("subforge-check-")
            .suffix(".yaml")
            .tempfile()
            .map_err(|e| self.unavailable(format!("cannot create scratch file: {e}")))?;
        scratch
            .write_all(document.as_bytes())
            .and_then(|()| scratch.flush())
            .map_err(|e| self.unavailable(format!("cannot write scratch file: {e}")))?;

        debug!(
            "Validating config with '{}' against {:?}",
            self.binary,
            scratch.path()
        );

        // kill_on_drop covers both the timeout path and a caller dropping
        // the whole future mid-flight.
        let child = Command::new(&self.binary)
            .arg("-t")
            .arg("-f")
            .arg(scratch.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.unavailable(e.to_string()))?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ConvertError::Validation {
                    diagnostic: format!("failed to collect validator output: {e}"),
                });
            }
            Err(_) => {
                return Err(ConvertError::Validation {
                    diagnostic: format!(
                        "validator timed out after {}s",
                        self.timeout.as_secs()
                    ),
                });
            }
        };

        if output.status.success() {
            debug!("Validation passed");
            return Ok(());
        }

        let mut diagnostic = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostic.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(ConvertError::Validation {
            diagnostic: diagnostic.trim().to_string(),
        })
    }

    fn unavailable(&self, reason: String) -> ConvertError {
        ConvertError::ToolUnavailable {
            tool: self.binary.clone(),
            reason,
        }
    }
}
