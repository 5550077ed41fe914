//! Cache-first access to safety alerts.

use std::time::Duration;

use futures::Stream;
use pulse_api::dto::CreateAlertRequest;
use pulse_api::PulseApi;
use pulse_domain::{Alert, AlertSeverity, AlertType, DataError, Location};
use pulse_store::{now_millis, AlertRecord, Table};

use crate::mappers::{
    alert_record_to_domain, alert_records_to_domain, alert_to_record, alerts_to_records,
    alerts_to_domain,
};
use crate::outbox::PendingOp;
use crate::repository::{
    api_err, is_fresh, lock, store_err, watch_row, watch_table, SharedDb, DEFAULT_PAGE_SIZE,
};

#[derive(Clone)]
pub struct AlertRepository {
    api: PulseApi,
    db: SharedDb,
}

impl AlertRepository {
    pub fn new(api: PulseApi, db: SharedDb) -> Self {
        Self { api, db }
    }

    /// Live view of cached alerts that are still active, newest first.
    pub fn watch_active(&self) -> impl Stream<Item = Vec<Alert>> + Send {
        watch_table(self.db.clone(), Table::Alerts, |db| {
            db.list_alerts(true).map(|records| alert_records_to_domain(&records))
        })
    }

    /// Live view of every cached alert, active or not.
    pub fn watch_all(&self) -> impl Stream<Item = Vec<Alert>> + Send {
        watch_table(self.db.clone(), Table::Alerts, |db| {
            db.list_alerts(false).map(|records| alert_records_to_domain(&records))
        })
    }

    /// Live view of one alert, `None` while the row is absent.
    pub fn watch_by_id(&self, id: &str) -> impl Stream<Item = Option<Alert>> + Send {
        let id = id.to_string();
        watch_row(self.db.clone(), Table::Alerts, move |db| {
            Ok(db.get_alert_by_id(&id)?.map(|record| alert_record_to_domain(&record)))
        })
    }

    /// Read one alert, cache first; stale rows fall through to the network.
    pub async fn get_by_id(&self, id: &str, max_age: Option<Duration>) -> Result<Alert, DataError> {
        let now = now_millis();
        let cached = lock(&self.db)?.get_alert_by_id(id).map_err(store_err)?;
        if let Some(record) = cached {
            if is_fresh(record.fetched_at, max_age, now) {
                return Ok(alert_record_to_domain(&record));
            }
        }

        let dto = self.api.get_alert_by_id(id).await.map_err(api_err)?;
        let record = alert_to_record(&dto, now_millis());
        lock(&self.db)?.upsert_alert(&record).map_err(store_err)?;
        Ok(alert_record_to_domain(&record))
    }

    /// Raise an alert.  Same contract as news creation: retryable failures
    /// queue the write and return a provisional, unsynced alert.
    pub async fn create(
        &self,
        title: String,
        description: String,
        kind: AlertType,
        severity: AlertSeverity,
        location: Option<Location>,
    ) -> Result<Alert, DataError> {
        let request = CreateAlertRequest {
            title,
            description,
            kind: kind.value().to_string(),
            severity: severity.level(),
            latitude: location.as_ref().map(|l| l.latitude),
            longitude: location.as_ref().map(|l| l.longitude),
            radius_meters: location.as_ref().and_then(|l| l.radius_meters),
        };
        let address = location.and_then(|l| l.address);

        match self.api.create_alert(&request, None).await {
            Ok(dto) => {
                let record = alert_to_record(&dto, now_millis());
                lock(&self.db)?.upsert_alert(&record).map_err(store_err)?;
                Ok(alert_record_to_domain(&record))
            }
            Err(err) => {
                let err = api_err(err);
                if !err.is_retryable() {
                    return Err(err);
                }
                self.queue_create(request, address).await
            }
        }
    }

    async fn queue_create(
        &self,
        request: CreateAlertRequest,
        address: Option<String>,
    ) -> Result<Alert, DataError> {
        let now = now_millis();
        let provisional_id = format!("local-{}", uuid::Uuid::new_v4());
        let idempotency_key = uuid::Uuid::new_v4().to_string();

        let author = lock(&self.db)?.get_current_user().map_err(store_err)?;
        let author_id = author.map(|user| user.id).unwrap_or_default();

        let record = AlertRecord {
            id: provisional_id.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            kind: request.kind.clone(),
            severity: request.severity,
            latitude: request.latitude,
            longitude: request.longitude,
            address,
            radius_meters: request.radius_meters,
            author_id,
            is_active: true,
            expires_at: None,
            created_at: now,
            is_synced: false,
            fetched_at: now,
        };

        let op = PendingOp::CreateAlert { request };
        let payload =
            serde_json::to_string(&op).map_err(|err| DataError::Storage(err.to_string()))?;
        {
            let db = lock(&self.db)?;
            db.upsert_alert(&record).map_err(store_err)?;
            db.enqueue_outbox(&idempotency_key, op.tag(), &payload, Some(&provisional_id))
                .map_err(store_err)?;
        }
        tracing::info!(id = %provisional_id, "alert create queued for replay");
        Ok(alert_record_to_domain(&record))
    }

    /// Alerts near a point, straight from the server.  Results are not
    /// cached: the set depends on the query point, so rows from one query
    /// would poison another's view.
    pub async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: u32,
    ) -> Result<Vec<Alert>, DataError> {
        let dtos = self
            .api
            .get_nearby_alerts(latitude, longitude, radius_km)
            .await
            .map_err(api_err)?;
        Ok(alerts_to_domain(&dtos, now_millis()))
    }

    /// Reconcile the alert cache with the server.
    ///
    /// Fetches the full listing (inactive included, so the authoritative id
    /// set is complete), tombstones synced rows the server dropped, then
    /// lazily deactivates cached alerts whose expiry has passed.
    pub async fn refresh(&self) -> Result<usize, DataError> {
        let mut page = 1;
        let mut keep = Vec::new();
        let mut fetched = 0;

        loop {
            let batch = self
                .api
                .get_alerts(page, DEFAULT_PAGE_SIZE, false)
                .await
                .map_err(api_err)?;
            let records = alerts_to_records(&batch.items, now_millis());
            keep.extend(records.iter().map(|r| r.id.clone()));
            fetched += records.len();
            lock(&self.db)?.upsert_alerts_batch(&records).map_err(store_err)?;

            if batch.items.is_empty() || page >= batch.total_pages {
                break;
            }
            page += 1;
        }

        let (removed, expired) = {
            let db = lock(&self.db)?;
            let removed = db.retain_alerts(&keep).map_err(store_err)?;
            let expired = db.deactivate_expired_alerts(now_millis()).map_err(store_err)?;
            (removed, expired)
        };
        tracing::debug!(fetched, removed, expired, "alert cache reconciled");
        Ok(fetched)
    }
}
