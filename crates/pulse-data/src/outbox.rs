//! Replay of queued offline writes.
//!
//! The store keeps the queue durable; this module owns the operation shapes
//! and the drain policy.  Entries replay strictly in insertion order, each
//! carrying the idempotency key minted when it was queued, so a replay that
//! raced an earlier half-delivered attempt cannot double-post.

use pulse_api::dto::{CreateAlertRequest, CreateNewsRequest};
use pulse_api::PulseApi;
use pulse_domain::DataError;
use pulse_store::OutboxEntry;
use serde::{Deserialize, Serialize};

use crate::mappers::{alert_to_record, news_to_record};
use crate::repository::{api_err, lock, store_err, SharedDb};
use pulse_store::now_millis;

/// A write waiting in the outbox, serialized as the entry payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PendingOp {
    CreateNews { request: CreateNewsRequest },
    CreateAlert { request: CreateAlertRequest },
}

impl PendingOp {
    pub const CREATE_NEWS: &'static str = "create_news";
    pub const CREATE_ALERT: &'static str = "create_alert";

    pub fn tag(&self) -> &'static str {
        match self {
            Self::CreateNews { .. } => Self::CREATE_NEWS,
            Self::CreateAlert { .. } => Self::CREATE_ALERT,
        }
    }
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Entries delivered and swapped for their canonical rows.
    pub drained: usize,
    /// Entries the server permanently rejected; dropped with their
    /// provisional rows.
    pub dropped: usize,
    /// Entries still queued when the pass stopped.
    pub remaining: usize,
}

/// Replays the outbox against the API.
///
/// Run on connectivity regain or app foreground; a pass stops at the first
/// retryable failure so order is preserved for the next attempt.
#[derive(Clone)]
pub struct OutboxDrainer {
    api: PulseApi,
    db: SharedDb,
}

impl OutboxDrainer {
    pub fn new(api: PulseApi, db: SharedDb) -> Self {
        Self { api, db }
    }

    /// One drain pass over the queue, oldest entry first.
    pub async fn drain(&self) -> Result<DrainReport, DataError> {
        let entries = lock(&self.db)?.list_outbox().map_err(store_err)?;
        let total = entries.len();
        let mut report = DrainReport::default();

        for entry in entries {
            match self.replay(&entry).await {
                Ok(()) => {
                    self.settle(&entry)?;
                    report.drained += 1;
                }
                Err(err) if err.is_retryable() => {
                    lock(&self.db)?
                        .record_outbox_attempt(entry.id, &err.to_string())
                        .map_err(store_err)?;
                    tracing::info!(entry = entry.id, error = %err, "drain paused, will retry");
                    break;
                }
                Err(err) => {
                    tracing::warn!(entry = entry.id, error = %err, "queued write rejected, dropping");
                    self.settle(&entry)?;
                    report.dropped += 1;
                }
            }
        }

        report.remaining = total - report.drained - report.dropped;
        Ok(report)
    }

    /// Deliver one entry and mirror the canonical row into the cache.
    async fn replay(&self, entry: &OutboxEntry) -> Result<(), DataError> {
        let op: PendingOp = serde_json::from_str(&entry.payload)
            .map_err(|err| DataError::Storage(format!("undecodable outbox payload: {err}")))?;
        let key = Some(entry.idempotency_key.as_str());

        match op {
            PendingOp::CreateNews { request } => {
                let dto = self.api.create_news(&request, key).await.map_err(api_err)?;
                let record = news_to_record(&dto, now_millis());
                lock(&self.db)?.upsert_news(&record).map_err(store_err)?;
            }
            PendingOp::CreateAlert { request } => {
                let dto = self.api.create_alert(&request, key).await.map_err(api_err)?;
                let record = alert_to_record(&dto, now_millis());
                lock(&self.db)?.upsert_alert(&record).map_err(store_err)?;
            }
        }
        Ok(())
    }

    /// Remove an entry and its provisional row.  Used both after delivery
    /// (the canonical row is already cached) and on permanent rejection (the
    /// phantom post disappears rather than lingering unsynced forever).
    fn settle(&self, entry: &OutboxEntry) -> Result<(), DataError> {
        let db = lock(&self.db)?;
        if let Some(provisional_id) = &entry.provisional_id {
            match entry.operation.as_str() {
                PendingOp::CREATE_NEWS => {
                    db.delete_news(provisional_id).map_err(store_err)?;
                }
                PendingOp::CREATE_ALERT => {
                    db.delete_alert(provisional_id).map_err(store_err)?;
                }
                other => tracing::warn!(operation = other, "unknown outbox operation tag"),
            }
        }
        db.delete_outbox_entry(entry.id).map_err(store_err)?;
        Ok(())
    }
}
