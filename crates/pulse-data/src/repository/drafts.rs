//! Local-only draft storage.  No remote side at all: drafts never leave the
//! device, so every operation here is a cache operation.

use futures::Stream;
use pulse_domain::{DataError, Draft, DraftType};
use pulse_store::{now_millis, Table};

use crate::mappers::{draft_record_to_domain, draft_records_to_domain, draft_to_record};
use crate::repository::{lock, store_err, watch_table, SharedDb};

#[derive(Clone)]
pub struct DraftRepository {
    db: SharedDb,
}

impl DraftRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    /// Live view of every draft, most recently updated first.
    pub fn watch_all(&self) -> impl Stream<Item = Vec<Draft>> + Send {
        watch_table(self.db.clone(), Table::Drafts, |db| {
            db.list_drafts(None).map(|records| draft_records_to_domain(&records))
        })
    }

    /// Live view filtered to one draft kind.
    pub fn watch_by_kind(&self, kind: DraftType) -> impl Stream<Item = Vec<Draft>> + Send {
        watch_table(self.db.clone(), Table::Drafts, move |db| {
            db.list_drafts(Some(kind.value()))
                .map(|records| draft_records_to_domain(&records))
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Draft, DataError> {
        let record = lock(&self.db)?.get_draft_by_id(id).map_err(store_err)?;
        record.as_ref().map(draft_record_to_domain).ok_or(DataError::NotFound)
    }

    /// Insert or update a draft.  A zero id inserts and the assigned rowid is
    /// returned; a nonzero id replaces that row.  `updated_at` is stamped
    /// here.
    pub async fn save(&self, mut draft: Draft) -> Result<i64, DataError> {
        let now = now_millis();
        if draft.created_at == 0 {
            draft.created_at = now;
        }
        draft.updated_at = now;

        let record = draft_to_record(&draft);
        lock(&self.db)?.upsert_draft(&record).map_err(store_err)
    }

    /// Delete a draft, typically after its content was submitted.
    pub async fn delete(&self, id: i64) -> Result<(), DataError> {
        let deleted = lock(&self.db)?.delete_draft(id).map_err(store_err)?;
        if !deleted {
            return Err(DataError::NotFound);
        }
        Ok(())
    }
}
