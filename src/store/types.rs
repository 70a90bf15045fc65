use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::orders::types::{schedule_format, OrderSubmission, RunMode, RunPlan};

/// Orders submitted together from one form submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderBatch {
    pub batch_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub run_plan: RunPlan,
    pub orders: Vec<OrderSubmission>,
}

impl OrderBatch {
    pub fn new(run_plan: RunPlan, orders: Vec<OrderSubmission>) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            created_at: Utc::now(),
            run_plan,
            orders,
        }
    }

    /// Status a batch starts in when it is first recorded.
    pub fn initial_status(&self) -> BatchStatus {
        match self.run_plan {
            RunPlan::Immediate => BatchStatus::Queued,
            RunPlan::Scheduled { .. } => BatchStatus::Scheduled,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Ready for the broker now
    Queued,
    /// Waiting for its scheduled time
    Scheduled,
    /// Scheduled time reached, ready for the broker
    Due,
    /// Recorded, but its release could not be scheduled
    Failed,
}

/// One line of `orders.jsonl`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredOrder {
    pub batch_id: Uuid,
    pub seq: usize,
    pub recorded_at: DateTime<Utc>,
    pub order: OrderSubmission,
}

/// One line of `batch_events.jsonl`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchStatusRecord {
    pub batch_id: Uuid,
    pub status: BatchStatus,
    pub at: DateTime<Utc>,
}

/// Latest known state of a recorded batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub orders: usize,
    pub run_mode: RunMode,
    #[serde(default, with = "schedule_format::option")]
    pub scheduled_at: Option<NaiveDateTime>,
    pub status: BatchStatus,
    pub updated_at: DateTime<Utc>,
}
