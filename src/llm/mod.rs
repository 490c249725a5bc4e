pub mod openai;
pub mod types;

use crate::config::Retry;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub use openai::OpenAiCompleter;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Timeouts, connection failures, rate limits and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Transport(_) => true,
            LlmError::Status { status, .. } => *status == 429 || *status >= 500,
            LlmError::Malformed(_) => false,
        }
    }
}

/// One prompt in, one opaque text response out.
pub trait Completer: Sync {
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

impl<C: Completer + ?Sized> Completer for &C {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt)
    }
}

/// Re-sends retryable failures up to `max_attempts` total, doubling the delay each time.
pub struct Retrying<C> {
    inner: C,
    max_attempts: u32,
    backoff: Duration,
}

impl<C: Completer> Retrying<C> {
    pub fn new(inner: C, cfg: &Retry) -> Self {
        Self {
            inner,
            max_attempts: cfg.max_attempts.max(1),
            backoff: Duration::from_millis(cfg.backoff_ms),
        }
    }
}

impl<C: Completer> Completer for Retrying<C> {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut attempt = 1;
        loop {
            match self.inner.complete(prompt) {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "completion attempt {attempt}/{} failed: {err}; retrying in {:?}",
                        self.max_attempts, delay
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        error: fn() -> LlmError,
    }

    impl Completer for Flaky {
        fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err((self.error)())
            } else {
                Ok("done".into())
            }
        }
    }

    fn no_wait(max_attempts: u32) -> Retry {
        Retry {
            max_attempts,
            backoff_ms: 0,
        }
    }

    #[test]
    fn single_attempt_by_default() {
        let flaky = Flaky {
            failures: 1,
            calls: AtomicU32::new(0),
            error: || LlmError::Transport("reset".into()),
        };
        let r = Retrying::new(&flaky, &Retry::default());
        assert!(r.complete("p").is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recovers_within_budget() {
        let flaky = Flaky {
            failures: 2,
            calls: AtomicU32::new(0),
            error: || LlmError::Status {
                status: 429,
                body: "slow down".into(),
            },
        };
        let r = Retrying::new(&flaky, &no_wait(3));
        assert_eq!(r.complete("p").unwrap(), "done");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let flaky = Flaky {
            failures: 10,
            calls: AtomicU32::new(0),
            error: || LlmError::Transport("timeout".into()),
        };
        let r = Retrying::new(&flaky, &no_wait(4));
        assert!(r.complete("p").is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let flaky = Flaky {
            failures: 10,
            calls: AtomicU32::new(0),
            error: || LlmError::Status {
                status: 401,
                body: "bad key".into(),
            },
        };
        let r = Retrying::new(&flaky, &no_wait(5));
        assert!(r.complete("p").is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }
}
