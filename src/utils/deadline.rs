//! Bounded waits for durable-store calls.

use serde_json::json;
use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Runs `future` with a deadline.
///
/// A timeout surfaces as [`AppError::Unavailable`]; the operation name ends
/// up in the log line and the error details.
pub async fn with_deadline<T, F>(
    limit: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Storage call timed out"
            );
            Err(AppError::unavailable(
                "Storage timed out",
                json!({ "operation": operation }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_result() {
        let value = with_deadline(Duration::from_secs(1), "op", async { Ok::<_, AppError>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_as_unavailable() {
        let result: Result<(), AppError> = with_deadline(Duration::from_millis(10), "slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(AppError::Unavailable { .. })));
    }
}
