
use crate::services::base::status::Status;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Governs a single call: cancellation and an optional deadline.
/// Dropping the raced future aborts the in-flight network request.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    timeout: Option<Duration>,
}

impl CallContext {
    pub fn new() -> Self {
        CallContext::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// A context that is cancelled together with this one but can be cancelled on its own.
    pub fn child(&self) -> Self {
        CallContext {
            token: self.token.child_token(),
            timeout: self.timeout,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn cancelled(&self) -> WaitForCancellationFutureOwned {
        self.token.clone().cancelled_owned()
    }

    pub async fn run<F, R>(&self, operation: &str, future: F) -> Result<R, Status>
    where
        F: Future<Output = Result<R, Status>>,
    {
        if self.token.is_cancelled() {
            return Err(Status::Cancelled(operation.to_string()));
        }

        let guarded = async {
            match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, future)
                    .await
                    .map_err(|_| Status::Timeout(format!("{} did not complete within {:?}", operation, timeout)))?,
                None => future.await,
            }
        };

        tokio::select! {
            _ = self.token.cancelled() => Err(Status::Cancelled(operation.to_string())),
            result = guarded => result,
        }
    }
}
