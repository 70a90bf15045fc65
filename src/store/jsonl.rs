//! JSON-lines persistence for submitted batches.
//!
//! `orders.jsonl` holds one line per order, `batch_events.jsonl` one line per
//! status transition. Both files are append-only; the current status of a
//! batch is the last transition recorded for it.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::constants::store::{BATCH_EVENTS_FILE, ORDERS_FILE};
use crate::error::StoreError;
use crate::orders::types::OrderSubmission;

use super::traits::{OrderSink, StoreResult};
use super::types::{BatchStatus, BatchStatusRecord, BatchSummary, OrderBatch, StoredOrder};

pub(crate) fn append_jsonl<T: Serialize>(path: &Path, entries: &[T]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let mut buf = String::new();
    for entry in entries {
        buf.push_str(&serde_json::to_string(entry)?);
        buf.push('\n');
    }
    f.write_all(buf.as_bytes())?;
    Ok(())
}

/// Read every line of a JSON-lines file. A missing file reads as empty.
pub(crate) fn read_jsonl<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let f = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::Io(e)),
    };

    let mut out = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        out.push(serde_json::from_str(&line)?);
    }
    Ok(out)
}

/// Run file I/O off the async workers.
async fn blocking<T, F>(f: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

pub struct JsonlOrderStore {
    orders_path: Arc<PathBuf>,
    events_path: Arc<PathBuf>,
    write_lock: Mutex<()>,
}

impl JsonlOrderStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            orders_path: Arc::new(dir.join(ORDERS_FILE)),
            events_path: Arc::new(dir.join(BATCH_EVENTS_FILE)),
            write_lock: Mutex::new(()),
        }
    }

    pub fn orders_path(&self) -> &Path {
        &self.orders_path
    }

    /// Orders of one batch, in submission order.
    pub fn orders_for(&self, batch_id: Uuid) -> StoreResult<Vec<OrderSubmission>> {
        let mut stored: Vec<StoredOrder> = read_jsonl(&self.orders_path)?;
        stored.retain(|s| s.batch_id == batch_id);
        stored.sort_by_key(|s| s.seq);
        Ok(stored.into_iter().map(|s| s.order).collect())
    }

    /// Append a status transition for a batch already in the log.
    async fn transition(&self, batch_id: Uuid, status: BatchStatus) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let events_path = self.events_path.clone();

        blocking(move || {
            let known: Vec<BatchStatusRecord> = read_jsonl(&events_path)?;
            if !known.iter().any(|r| r.batch_id == batch_id) {
                warn!("[STORE] {:?} transition for unknown batch {}", status, batch_id);
                return Err(StoreError::BatchNotFound(batch_id));
            }
            append_status(&events_path, batch_id, status)
        })
        .await?;

        info!("⏰ [STORE] Batch {} is {:?}", batch_id, status);
        Ok(())
    }
}

fn append_status(path: &Path, batch_id: Uuid, status: BatchStatus) -> StoreResult<()> {
    let record = BatchStatusRecord {
        batch_id,
        status,
        at: Utc::now(),
    };
    append_jsonl(path, &[record])
}

fn summarize(orders: Vec<StoredOrder>, events: Vec<BatchStatusRecord>) -> Vec<BatchSummary> {
    let mut summaries: Vec<BatchSummary> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for stored in &orders {
        match index.get(&stored.batch_id) {
            Some(&i) => summaries[i].orders += 1,
            None => {
                index.insert(stored.batch_id, summaries.len());
                summaries.push(BatchSummary {
                    batch_id: stored.batch_id,
                    orders: 1,
                    run_mode: stored.order.run_mode(),
                    scheduled_at: stored.order.scheduled_at(),
                    status: BatchStatus::Queued,
                    updated_at: stored.recorded_at,
                });
            }
        }
    }

    for record in events {
        if let Some(&i) = index.get(&record.batch_id) {
            summaries[i].status = record.status;
            summaries[i].updated_at = record.at;
        }
    }

    summaries
}

#[async_trait]
impl OrderSink for JsonlOrderStore {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    async fn record_batch(&self, batch: &OrderBatch) -> StoreResult<BatchStatus> {
        let _guard = self.write_lock.lock().await;

        let recorded_at = Utc::now();
        let lines: Vec<StoredOrder> = batch
            .orders
            .iter()
            .enumerate()
            .map(|(seq, order)| StoredOrder {
                batch_id: batch.batch_id,
                seq,
                recorded_at,
                order: order.clone(),
            })
            .collect();
        let count = lines.len();
        let batch_id = batch.batch_id;
        let status = batch.initial_status();
        let orders_path = self.orders_path.clone();
        let events_path = self.events_path.clone();

        blocking(move || {
            append_jsonl(&orders_path, &lines)?;
            append_status(&events_path, batch_id, status)
        })
        .await?;

        info!(
            "💾 [STORE] Recorded batch {} ({} orders, {:?})",
            batch_id, count, status
        );
        Ok(status)
    }

    async fn mark_due(&self, batch_id: Uuid) -> StoreResult<()> {
        self.transition(batch_id, BatchStatus::Due).await
    }

    async fn mark_failed(&self, batch_id: Uuid) -> StoreResult<()> {
        self.transition(batch_id, BatchStatus::Failed).await
    }

    async fn batches(&self) -> StoreResult<Vec<BatchSummary>> {
        let orders_path = self.orders_path.clone();
        let events_path = self.events_path.clone();

        blocking(move || {
            let orders: Vec<StoredOrder> = read_jsonl(&orders_path)?;
            let events: Vec<BatchStatusRecord> = read_jsonl(&events_path)?;
            Ok(summarize(orders, events))
        })
        .await
    }
}
