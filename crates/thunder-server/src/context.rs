//! Request-scoped context.
//!
//! Every service operation receives a [`RequestContext`] carrying a request
//! id for log correlation and a cancellation token fed by the request
//! deadline. Store calls against the mutable backend are raced against the
//! token so an elapsed deadline surfaces promptly as
//! [`StoreError::Cancelled`]; file-store reads are in-memory and do not poll
//! cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use thunder_store::StoreError;

/// Context threaded through one service operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation id for logs
    pub request_id: String,
    /// Cooperative cancellation, fed by the caller's deadline
    pub cancellation: Arc<CancellationToken>,
}

impl RequestContext {
    /// Fresh context with a generated request id and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            cancellation: Arc::new(CancellationToken::new()),
        }
    }

    /// Context that cancels itself after `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Duration) -> Self {
        let ctx = Self::new();
        let token = Arc::clone(&ctx.cancellation);
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            token.cancel();
        });
        ctx
    }

    /// Whether the caller has given up on this request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Run a store operation, returning [`StoreError::Cancelled`] as soon as
    /// the context is cancelled, without waiting for the operation.
    pub async fn run<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::select! {
            () = self.cancellation.cancelled() => Err(StoreError::Cancelled),
            result = operation => result,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
