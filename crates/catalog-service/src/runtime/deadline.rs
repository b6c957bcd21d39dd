//! Invocation deadlines.
//!
//! Every API call and batch runs under the smaller of its configured timeout and the
//! time the Lambda runtime has left. Writes committed before expiry stay committed.

use crate::catalog::CatalogError;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::error;

/// The configured limit, shortened to what remains before `deadline_ms` (milliseconds
/// since the Unix epoch, as reported by the Lambda runtime) when one is known.
pub fn effective_timeout(configured: Duration, deadline_ms: Option<u64>) -> Duration {
    let Some(deadline_ms) = deadline_ms else {
        return configured;
    };
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    configured.min(Duration::from_millis(deadline_ms.saturating_sub(now_ms)))
}

/// Run `work`, failing with `DeadlineExceeded` once `limit` has passed.
///
/// A zero limit fails without polling `work` at all.
pub async fn with_deadline<T, F>(limit: Duration, work: F) -> Result<T, CatalogError>
where
    F: Future<Output = Result<T, CatalogError>>,
{
    if limit.is_zero() {
        error!("Deadline already passed");
        return Err(CatalogError::DeadlineExceeded(limit));
    }
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => {
            error!(limit = ?limit, "Deadline exceeded");
            Err(CatalogError::DeadlineExceeded(limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambda_deadline_shortens_limit() {
        let now_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as u64;

        let limit = effective_timeout(Duration::from_secs(300), Some(now_ms + 2_000));
        assert!(limit <= Duration::from_secs(2));

        let expired = effective_timeout(Duration::from_secs(6), Some(now_ms - 1_000));
        assert_eq!(expired, Duration::ZERO);

        assert_eq!(effective_timeout(Duration::from_secs(6), None), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_work_times_out() {
        let result: Result<(), _> = with_deadline(Duration::from_secs(6), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(CatalogError::DeadlineExceeded(_))));
    }

    #[tokio::test]
    async fn test_fast_work_passes_through() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, CatalogError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_zero_limit_never_runs_work() {
        let ran = std::sync::atomic::AtomicBool::new(false);
        let result = with_deadline(Duration::ZERO, async {
            ran.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, CatalogError>(7)
        })
        .await;

        assert!(matches!(result, Err(CatalogError::DeadlineExceeded(_))));
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
