//! Order submission: validation gate, handoff to the sink, and scheduled release.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::bus::EventBus;
use crate::constants::events::{BATCH_DUE, BATCH_QUEUED, BATCH_SCHEDULED, SUBMIT_REJECTED};
use crate::error::SubmitError;
use crate::events::{BatchEvent, Event};
use crate::orders::types::schedule_format;
use crate::orders::{prepare_submission, OrderDefaults, OrderRowInput, RunPlan};
use crate::store::{BatchStatus, OrderBatch, OrderSink};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub batch_id: Uuid,
    pub orders: usize,
    pub status: BatchStatus,
    #[serde(with = "schedule_format::option")]
    pub scheduled_at: Option<NaiveDateTime>,
}

pub struct SubmissionService {
    sink: Arc<dyn OrderSink>,
    defaults: OrderDefaults,
    bus: EventBus,
    scheduler: JobScheduler,
}

impl SubmissionService {
    pub async fn new(
        sink: Arc<dyn OrderSink>,
        defaults: OrderDefaults,
        bus: EventBus,
    ) -> Result<Self, SubmitError> {
        let scheduler = JobScheduler::new().await?;
        scheduler.start().await?;
        let service = Self {
            sink,
            defaults,
            bus,
            scheduler,
        };
        let resumed = service.resume_scheduled().await?;
        info!(
            "📮 [DESK] Submission service ready (sink: {}, resumed: {})",
            service.sink.name(),
            resumed
        );
        Ok(service)
    }

    /// Re-register release jobs for batches a previous run left scheduled.
    async fn resume_scheduled(&self) -> Result<usize, SubmitError> {
        let mut resumed = 0;
        for summary in self.sink.batches().await? {
            if summary.status != BatchStatus::Scheduled {
                continue;
            }
            let Some(at) = summary.scheduled_at else {
                warn!("[SCHED] Batch {} is scheduled without a time", summary.batch_id);
                continue;
            };
            self.schedule_due(summary.batch_id, at).await?;
            info!("[SCHED] Resumed batch {} for {}", summary.batch_id, at);
            resumed += 1;
        }
        Ok(resumed)
    }

    pub fn defaults(&self) -> &OrderDefaults {
        &self.defaults
    }

    /// Validate and hand a form's rows to the sink.
    ///
    /// Nothing reaches the sink while the form has validation errors.
    pub async fn submit(
        &self,
        rows: &[OrderRowInput],
        plan: RunPlan,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let orders = match prepare_submission(rows, &plan, &self.defaults) {
            Ok(orders) => orders,
            Err(errors) => {
                warn!(
                    event = SUBMIT_REJECTED,
                    errors = errors.len(),
                    "[DESK] Submission blocked: {}",
                    errors
                );
                self.bus.notify(Event::SubmitRejected {
                    errors: errors.messages(),
                });
                return Err(errors.into());
            }
        };

        let batch = OrderBatch::new(plan, orders);
        let status = self.sink.record_batch(&batch).await?;
        let count = batch.orders.len();

        match plan {
            RunPlan::Immediate => {
                info!(event = BATCH_QUEUED, batch_id = %batch.batch_id, orders = count, "[DESK] Batch queued");
                self.bus.notify(Event::Batch(BatchEvent::Queued {
                    batch_id: batch.batch_id,
                    orders: count,
                }));
            }
            RunPlan::Scheduled { at } => {
                if let Err(e) = self.schedule_due(batch.batch_id, at).await {
                    return Err(self.abandon(batch.batch_id, e).await);
                }
                info!(event = BATCH_SCHEDULED, batch_id = %batch.batch_id, orders = count, %at, "[DESK] Batch scheduled");
                self.bus.notify(Event::Batch(BatchEvent::Scheduled {
                    batch_id: batch.batch_id,
                    orders: count,
                    at,
                }));
            }
        }

        Ok(SubmissionReceipt {
            batch_id: batch.batch_id,
            orders: count,
            status,
            scheduled_at: plan.scheduled_at(),
        })
    }

    /// Mark a recorded batch failed after its release could not be scheduled.
    pub(crate) async fn abandon(&self, batch_id: Uuid, err: SubmitError) -> SubmitError {
        error!("[SCHED] Could not schedule batch {}: {}", batch_id, err);
        if let Err(e) = self.sink.mark_failed(batch_id).await {
            error!("[STORE] Failed to mark batch {} failed: {}", batch_id, e);
        }
        err
    }

    /// Register a one-shot job that marks the batch due at `at`.
    async fn schedule_due(&self, batch_id: Uuid, at: NaiveDateTime) -> Result<(), SubmitError> {
        let delay = delay_until(at, Local::now().naive_local());
        if delay.is_zero() {
            warn!("[SCHED] Batch {} scheduled in the past ({}); releasing now", batch_id, at);
        }

        let sink = self.sink.clone();
        let bus = self.bus.clone();
        let job = Job::new_one_shot_async(delay, move |_uuid, _l| {
            let sink = sink.clone();
            let bus = bus.clone();
            Box::pin(async move {
                match sink.mark_due(batch_id).await {
                    Ok(()) => {
                        info!(event = BATCH_DUE, batch_id = %batch_id, "[SCHED] Batch released");
                        bus.notify(Event::Batch(BatchEvent::Due { batch_id }));
                    }
                    Err(e) => error!("[SCHED] Failed to release batch {}: {}", batch_id, e),
                }
            })
        })?;

        self.scheduler.add(job).await?;
        Ok(())
    }
}

/// Time left until `at`, zero when it has already passed.
pub fn delay_until(at: NaiveDateTime, now: NaiveDateTime) -> Duration {
    (at - now).to_std().unwrap_or(Duration::ZERO)
}
