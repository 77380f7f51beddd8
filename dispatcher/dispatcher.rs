use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lib::timeutil::default_timezone;
use lib::types::{
    BatchId,
    BatchOutcome,
    BatchStatus,
    BatchSummary,
    CallRecord,
    CallResult,
    DispatchRequest,
    Recipient,
};
use metrics::{counter, decrement_gauge, increment_gauge};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};
use validator::Validate;

use crate::call_record_store::CallRecordStore;
use crate::caller::CallInitiator;

/// Outstanding calls per group. Requests beyond the window queue until a
/// slot frees.
pub const CALL_CONCURRENCY_LIMIT: usize = 5;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Invalid dispatch request: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Splits `items` into contiguous groups of `group_size`, preserving order.
/// The last group may be shorter.
fn partition_groups<T>(items: &[T], group_size: usize) -> Vec<&[T]> {
    items.chunks(group_size).collect()
}

/// Turns a recipient list plus a pacing configuration into one result per
/// recipient and an aggregate summary. Groups run strictly sequentially;
/// recipients within a group run with bounded concurrency.
pub struct BatchDispatcher {
    initiator: Arc<dyn CallInitiator + Send + Sync>,
    record_store: Arc<dyn CallRecordStore + Send + Sync>,
}

impl BatchDispatcher {
    pub fn new(
        initiator: Arc<dyn CallInitiator + Send + Sync>,
        record_store: Arc<dyn CallRecordStore + Send + Sync>,
    ) -> Self {
        Self {
            initiator,
            record_store,
        }
    }

    #[tracing::instrument(skip_all, fields(batch_name = %request.batch_name))]
    pub async fn dispatch(
        &self,
        request: DispatchRequest,
    ) -> Result<BatchOutcome, DispatchError> {
        request.validate()?;

        let batch_id =
            request.batch_id.clone().unwrap_or_else(BatchId::new);
        let created_at = Utc::now().with_timezone(&default_timezone());
        let total_recipients = request.recipients.len();

        let groups = partition_groups(
            &request.recipients,
            request.config.batch_size as usize,
        );
        let total_groups = groups.len();
        let interval =
            Duration::from_secs(request.config.interval_minutes * 60);

        // Only the pauses between groups count towards the estimate.
        let estimated_completion_time = created_at
            + chrono::Duration::minutes(
                total_groups.saturating_sub(1) as i64
                    * request.config.interval_minutes as i64,
            );

        info!(
            batch_id = %batch_id,
            recipients = total_recipients,
            groups = total_groups,
            "dispatch-batch"
        );
        counter!("dispatcher.batches_total", 1);

        let mut results: Vec<CallResult> =
            Vec::with_capacity(total_recipients);
        for (group_index, group) in groups.iter().enumerate() {
            debug!(
                batch_id = %batch_id,
                "Dispatching group {}/{} with {} recipients",
                group_index + 1,
                total_groups,
                group.len()
            );
            results.extend(self.dispatch_group(&batch_id, group).await);

            if group_index + 1 < total_groups && !interval.is_zero() {
                debug!(
                    batch_id = %batch_id,
                    "Waiting {:?} before the next group",
                    interval
                );
                tokio::time::sleep(interval).await;
            }
        }

        let successful_calls = results.iter().filter(|r| r.success).count();
        let failed_calls = results.len() - successful_calls;
        let db_failures =
            results.iter().filter(|r| !r.db_inserted).count();

        info!(
            batch_id = %batch_id,
            successful_calls,
            failed_calls,
            db_failures,
            "dispatch-batch: completed"
        );

        let summary = BatchSummary {
            batch_id,
            batch_name: request.batch_name,
            total_recipients,
            successful_calls,
            failed_calls,
            status: BatchStatus::Completed,
            created_at,
            total_groups,
            estimated_completion_time,
        };

        Ok(BatchOutcome { summary, results })
    }

    async fn dispatch_group(
        &self,
        batch_id: &BatchId,
        group: &[Recipient],
    ) -> Vec<CallResult> {
        let semaphore = Arc::new(Semaphore::new(CALL_CONCURRENCY_LIMIT));
        let jobs = group.iter().map(|recipient| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                // The semaphore lives for the whole group, acquire cannot
                // fail.
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("call semaphore closed");
                self.call_one(batch_id, recipient).await
            }
        });

        futures::future::join_all(jobs).await
    }

    #[tracing::instrument(skip_all, fields(
            batch_id = %batch_id,
            recipient_id = %recipient.recipient_id,
            ))]
    async fn call_one(
        &self,
        batch_id: &BatchId,
        recipient: &Recipient,
    ) -> CallResult {
        counter!("dispatcher.calls_total", 1);
        increment_gauge!("dispatcher.inflight_calls_total", 1.0);

        let details = self.initiator.initiate(batch_id, recipient).await;
        let success = details.is_success();
        if !success {
            counter!("dispatcher.failed_calls_total", 1);
        }

        // The record is upserted whether the call went through or not, and
        // a failed upsert never overrides the call's own outcome.
        let record = CallRecord {
            recipient_id: recipient.recipient_id.clone(),
            batch_id: batch_id.clone(),
        };
        let (db_inserted, db_error) =
            match self.record_store.upsert_record(&record).await {
                | Ok(()) => (true, None),
                | Err(e) => {
                    error!(
                        "Failed to persist call record for recipient {}: {}",
                        recipient.recipient_id, e
                    );
                    (false, Some(e.to_string()))
                }
            };

        decrement_gauge!("dispatcher.inflight_calls_total", 1.0);

        debug!(
            success,
            db_inserted,
            "dispatch-call"
        );

        CallResult {
            recipient_id: recipient.recipient_id.clone(),
            recipient_name: recipient.name.clone(),
            recipient_phone: recipient.phone.clone(),
            success,
            error: details.error_msg,
            response: details.response_payload,
            db_inserted,
            db_error,
        }
    }
}
