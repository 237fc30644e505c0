//! Background worker recording pixel clicks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::application::services::ClickService;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

const MAX_RETRIES: usize = 3;

/// Drains the pixel queue until every sender is dropped.
///
/// Up to `concurrency` events are recorded at once. Store failures are
/// retried with jittered exponential backoff; validity failures (unknown,
/// inactive or expired links) are logged and dropped since retrying cannot
/// change their outcome.
pub async fn run_click_worker<L, K>(
    mut rx: mpsc::Receiver<ClickEvent>,
    service: Arc<ClickService<L, K>>,
    concurrency: usize,
) where
    L: LinkRepository + 'static,
    K: ClickRepository + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let service = service.clone();

        tokio::spawn(async move {
            record_with_retry(&service, event).await;
            drop(permit);
        });
    }

    // Wait for in-flight events before returning.
    let _ = permits.acquire_many(concurrency.max(1) as u32).await;
    tracing::info!("Click worker stopped");
}

async fn record_with_retry<L, K>(service: &ClickService<L, K>, event: ClickEvent)
where
    L: LinkRepository,
    K: ClickRepository,
{
    let strategy = ExponentialBackoff::from_millis(10)
        .factor(2)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::start(
        strategy,
        || service.record_click(&event.code, event.metadata.clone()),
        |e: &AppError| matches!(e, AppError::Internal { .. }),
    )
    .await;

    match result {
        Ok(receipt) => {
            tracing::debug!(
                code = %event.code,
                click_id = receipt.click_id,
                queued_ms = (chrono::Utc::now() - event.received_at).num_milliseconds(),
                "Pixel click recorded"
            );
        }
        Err(AppError::LinkUnavailable(reason)) => {
            tracing::debug!(code = %event.code, reason = %reason, "Pixel click ignored");
        }
        Err(e) => {
            metrics::counter!("clicks_dropped_total", "reason" => "store_error").increment(1);
            tracing::error!(code = %event.code, error = %e, "Failed to record pixel click");
        }
    }
}
