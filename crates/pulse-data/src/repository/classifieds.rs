//! Cache-first access to marketplace listings.  Read-only surface: listings
//! are published elsewhere, this side only browses.

use std::time::Duration;

use futures::Stream;
use pulse_api::PulseApi;
use pulse_domain::{Classified, ClassifiedCategory, DataError};
use pulse_store::{now_millis, Table};

use crate::mappers::{
    classified_record_to_domain, classified_records_to_domain, classified_to_record,
    classifieds_to_records,
};
use crate::repository::{api_err, is_fresh, lock, store_err, watch_table, SharedDb, DEFAULT_PAGE_SIZE};

#[derive(Clone)]
pub struct ClassifiedRepository {
    api: PulseApi,
    db: SharedDb,
}

impl ClassifiedRepository {
    pub fn new(api: PulseApi, db: SharedDb) -> Self {
        Self { api, db }
    }

    /// Live view of active cached listings, newest first.
    pub fn watch_active(&self) -> impl Stream<Item = Vec<Classified>> + Send {
        watch_table(self.db.clone(), Table::Classifieds, |db| {
            db.list_active_classifieds(None)
                .map(|records| classified_records_to_domain(&records))
        })
    }

    /// Live view filtered to one category.
    pub fn watch_by_category(
        &self,
        category: ClassifiedCategory,
    ) -> impl Stream<Item = Vec<Classified>> + Send {
        watch_table(self.db.clone(), Table::Classifieds, move |db| {
            db.list_active_classifieds(Some(category.value()))
                .map(|records| classified_records_to_domain(&records))
        })
    }

    /// Read one listing, cache first; stale rows fall through to the network.
    pub async fn get_by_id(
        &self,
        id: &str,
        max_age: Option<Duration>,
    ) -> Result<Classified, DataError> {
        let now = now_millis();
        let cached = lock(&self.db)?.get_classified_by_id(id).map_err(store_err)?;
        if let Some(record) = cached {
            if is_fresh(record.fetched_at, max_age, now) {
                return Ok(classified_record_to_domain(&record));
            }
        }

        let dto = self.api.get_classified_by_id(id).await.map_err(api_err)?;
        let record = classified_to_record(&dto, now_millis());
        lock(&self.db)?.upsert_classified(&record).map_err(store_err)?;
        Ok(classified_record_to_domain(&record))
    }

    /// Reconcile the listing cache with the server, optionally scoped to one
    /// category.  Synced rows the server no longer returns are tombstoned.
    pub async fn refresh(&self, category: Option<ClassifiedCategory>) -> Result<usize, DataError> {
        let scope = category.map(|c| c.value());
        let mut page = 1;
        let mut keep = Vec::new();
        let mut fetched = 0;

        loop {
            let batch = self
                .api
                .get_classifieds(page, DEFAULT_PAGE_SIZE, scope)
                .await
                .map_err(api_err)?;
            let records = classifieds_to_records(&batch.items, now_millis());
            keep.extend(records.iter().map(|r| r.id.clone()));
            fetched += records.len();
            lock(&self.db)?
                .upsert_classifieds_batch(&records)
                .map_err(store_err)?;

            if batch.items.is_empty() || page >= batch.total_pages {
                break;
            }
            page += 1;
        }

        let removed = lock(&self.db)?
            .retain_classifieds(scope, &keep)
            .map_err(store_err)?;
        tracing::debug!(fetched, removed, "classified cache reconciled");
        Ok(fetched)
    }
}
