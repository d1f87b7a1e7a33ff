//! Bounded collaborator calls
//!
//! Every call to the store, the email notifier or the map provider goes
//! through [`CallPolicy::run`], which caps it with a timeout and folds the
//! outcome into a [`CallError`] that says how it failed.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    /// The collaborator answered and refused
    Rejected,
    /// No answer within the deadline; the call may still have been applied
    Timeout,
    /// The request never completed (connection, DNS, TLS, decode)
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct CallError {
    pub kind: CallErrorKind,
    pub message: String,
}

impl CallError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: CallErrorKind::Rejected,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: CallErrorKind::Timeout,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: CallErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == CallErrorKind::Timeout
    }
}

impl From<reqwest::Error> for CallError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(e.to_string())
        } else if e.is_status() {
            Self::rejected(e.to_string())
        } else {
            Self::transport(e.to_string())
        }
    }
}

/// Per-call deadline applied to collaborator calls
#[derive(Debug, Clone, Copy)]
pub struct CallPolicy {
    pub timeout: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl CallPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `fut` under the deadline.
    ///
    /// `Ok(Err(e))` is the collaborator's own failure; `Err(CallError)` with
    /// kind `Timeout` means the deadline passed first.
    pub async fn run<T, E, F>(&self, what: &str, fut: F) -> Result<Result<T, E>, CallError>
    where
        F: Future<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => Ok(result),
            Err(_) => {
                tracing::warn!(
                    call = what,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Collaborator call timed out"
                );
                Err(CallError::timeout(format!(
                    "{what} did not respond within {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_through_result() {
        let policy = CallPolicy::new(Duration::from_millis(200));

        let ok: Result<Result<u8, String>, CallError> =
            policy.run("fast", async { Ok(7) }).await;
        assert_eq!(ok, Ok(Ok(7)));

        let err: Result<Result<u8, String>, CallError> =
            policy.run("refuses", async { Err("nope".to_string()) }).await;
        assert_eq!(err, Ok(Err("nope".to_string())));
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let policy = CallPolicy::new(Duration::from_millis(50));
        let result: Result<Result<(), String>, CallError> = policy
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.message.contains("slow"));
    }
}
