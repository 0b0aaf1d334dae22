//! Timeout wrappers and default durations.

use crate::error::{Result, WampError};
use std::future::Future;
use std::time::Duration;

/// Default timeout for connection attempts
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default interval between keepalive heartbeats
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Run a future against a deadline, mapping expiry to
/// [`WampError::Timeout`] so callers see the same error kind a blocked
/// read timeout produces.
pub async fn with_timeout<F: Future>(duration: Duration, future: F) -> Result<F::Output> {
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| WampError::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expiry_maps_to_timeout() {
        let result = with_timeout(Duration::from_millis(10), std::future::pending::<()>()).await;
        assert!(matches!(result, Err(WampError::Timeout)));
    }

    #[tokio::test]
    async fn completion_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { 42 }).await;
        assert!(matches!(result, Ok(42)));
    }
}
