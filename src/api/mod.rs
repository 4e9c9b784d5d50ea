//! Application services behind the HTTP surface.
//!
//! [`BillIngestionService`] turns an uploaded bill into a [`BudgetResult`] and
//! opens the user's chat session; [`ChatReplyService`] answers follow-up
//! questions within that session.
//!
//! [`BudgetResult`]: crate::budget::BudgetResult

mod chat;
mod ingestion;
mod prompts;
mod response;
mod submission;

pub use chat::ChatReplyService;
pub use ingestion::BillIngestionService;
pub use prompts::{chat_context, recommendation_prompt, USAGE_PROMPT};
pub use response::{BillResponse, CarbonBudgetResponse, ChatResponse, BILL_SUCCESS_MESSAGE};
pub use submission::{BillSubmission, StagedUpload, DEFAULT_MODE, DEFAULT_USER_ID};

use crate::telemetry::Telemetry;
use crate::{Error, Result};

use std::future::Future;
use std::time::{Duration, Instant};

/// Await a model call, bounded by `timeout`, and record its latency.
pub(crate) async fn call_model<F, T>(
    telemetry: &Telemetry,
    timeout: Duration,
    what: &str,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let outcome = tokio::time::timeout(timeout, fut).await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    telemetry.record_model_call(elapsed_ms);

    match outcome {
        Ok(result) => {
            tracing::debug!(call = what, elapsed_ms, ok = result.is_ok(), "Model call finished");
            result
        }
        Err(_) => Err(Error::timeout(
            format!("{} did not finish in time", what),
            timeout.as_millis() as u64,
        )),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_model_times_out() {
        let telemetry = Telemetry::default();
        let err = call_model(&telemetry, Duration::from_millis(10), "slow call", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, Error>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Timeout { duration_ms: 10, .. }));
        assert!(err.to_string().contains("slow call"));
        assert_eq!(telemetry.metrics().model_calls, 1);
    }

    #[tokio::test]
    async fn test_call_model_passes_result_through() {
        let telemetry = Telemetry::default();
        let value = call_model(&telemetry, Duration::from_secs(1), "fast call", async {
            Ok::<_, Error>(42)
        })
        .await
        .unwrap();
        assert_eq!(value, 42);
    }
}
