//! Timeout helpers for async operations
//!
//! ```ignore
//! let result = with_timeout_map(Duration::from_secs(40), agent.analyze(&text), "team_analyzer").await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{Result, ScoreError};

/// Run an infallible future under a timeout
pub async fn with_timeout_map<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| ScoreError::timeout(operation_name, timeout))
}
