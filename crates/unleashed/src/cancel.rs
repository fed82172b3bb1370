//! Caller-driven cancellation.
//!
//! The client has no timeouts of its own. Dropping an operation's future
//! aborts the HTTP call in flight; these helpers do the dropping for the
//! two common cases.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use unleashed_transport::TransportError;

use crate::Error;

/// Runs `operation` until it finishes or `token` is cancelled.
///
/// A token that is already cancelled wins before the operation is polled.
///
/// # Errors
/// Returns [`TransportError::Cancelled`] if the token fired first, else
/// whatever the operation returned.
pub async fn cancellable<F, T>(
    token: &CancellationToken,
    operation: F,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => {
            tracing::debug!("operation cancelled");
            Err(Error::Transport(TransportError::Cancelled))
        }
        result = operation => result,
    }
}

/// Runs `operation` with a deadline `after` from now.
///
/// # Errors
/// Returns [`TransportError::TimedOut`] if the deadline elapsed first,
/// else whatever the operation returned.
pub async fn with_deadline<F, T>(after: Duration, operation: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(after, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(after = ?after, "deadline elapsed");
            Err(Error::Transport(TransportError::TimedOut))
        }
    }
}
