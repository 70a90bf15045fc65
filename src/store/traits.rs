use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;

use super::types::{BatchStatus, BatchSummary, OrderBatch};

pub type StoreResult<T> = Result<T, StoreError>;

/// Where validated batches go: broker client and/or local persistence.
#[async_trait]
pub trait OrderSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Accept a batch. Returns the status it was recorded with.
    async fn record_batch(&self, batch: &OrderBatch) -> StoreResult<BatchStatus>;

    /// A scheduled batch reached its time.
    async fn mark_due(&self, batch_id: Uuid) -> StoreResult<()>;

    /// A batch was recorded but could not be scheduled.
    async fn mark_failed(&self, batch_id: Uuid) -> StoreResult<()>;

    async fn batches(&self) -> StoreResult<Vec<BatchSummary>>;
}
