//! Per-call cancellation and deadline.

use std::future::{Future, pending};
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{Error, Result};

/// Caller-supplied limits for one client call.
///
/// The cancellation signal is a `watch` channel; sending `true` aborts every
/// in-flight call holding a receiver. Dropping the sender never cancels.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: Option<watch::Receiver<bool>>,
    timeout: Option<Duration>,
}

impl CallContext {
    /// A context without deadline or cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether the cancellation signal has already fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Runs `fut` unless the signal fires or the deadline elapses first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    if rx.wait_for(|c| *c).await.is_err() {
                        pending::<()>().await;
                    }
                }
                None => pending::<()>().await,
            }
        };

        let expired = async {
            match self.timeout {
                Some(after) => {
                    tokio::time::sleep(after).await;
                    after
                }
                None => pending::<Duration>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(Error::Cancelled),
            after = expired => Err(Error::TimedOut { after }),
            res = fut => res,
        }
    }
}
