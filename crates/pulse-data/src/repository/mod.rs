//! Repository layer: one authoritative access point per entity family.
//!
//! Shared plumbing lives here -- the cache handle type, conversions from the
//! store/api error types into the domain taxonomy, the freshness check, and
//! the live-query stream builder.

pub mod alerts;
pub mod classifieds;
pub mod drafts;
pub mod news;
pub mod users;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::Stream;
use pulse_api::ApiError;
use pulse_domain::DataError;
use pulse_store::{Database, StoreError, Table};

pub use alerts::AlertRepository;
pub use classifieds::ClassifiedRepository;
pub use drafts::DraftRepository;
pub use news::NewsRepository;
pub use users::UserRepository;

/// Page size used by the refresh walks (matches the backend default).
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// The cache handle shared by every repository.
///
/// Guards are held only around individual store calls, never across an await.
pub type SharedDb = Arc<Mutex<Database>>;

/// Lock the cache, mapping a poisoned mutex into the domain taxonomy.
pub(crate) fn lock(db: &SharedDb) -> Result<MutexGuard<'_, Database>, DataError> {
    db.lock()
        .map_err(|_| DataError::Storage("cache lock poisoned".to_string()))
}

/// Store errors become `NotFound` or `Storage`.
pub(crate) fn store_err(err: StoreError) -> DataError {
    match err {
        StoreError::NotFound => DataError::NotFound,
        other => DataError::Storage(other.to_string()),
    }
}

/// Remote errors map onto the taxonomy callers use to pick a recovery policy.
/// 5xx statuses are treated as transient, like transport failures; everything
/// else will not change on a retry of the same request.
pub(crate) fn api_err(err: ApiError) -> DataError {
    match err {
        ApiError::NotFound => DataError::NotFound,
        ApiError::Unauthorized => DataError::Unauthorized,
        ApiError::Rejected(message) => DataError::ServerRejected(message),
        ApiError::Status(status) if status >= 500 => {
            DataError::Transport(format!("server returned status {status}"))
        }
        ApiError::Status(status) => {
            DataError::ServerRejected(format!("server returned status {status}"))
        }
        ApiError::MissingData => DataError::Transport("response envelope missing data".to_string()),
        ApiError::Http(err) => DataError::Transport(err.to_string()),
    }
}

/// Whether a cached row is still usable under the caller's freshness contract.
/// `None` preserves the trust-any-row behavior.
pub(crate) fn is_fresh(fetched_at: i64, max_age: Option<Duration>, now: i64) -> bool {
    match max_age {
        None => true,
        Some(max_age) => {
            let budget = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
            now.saturating_sub(fetched_at) <= budget
        }
    }
}

/// Build a live query over one cache table.
///
/// The stream emits the current query result immediately, then re-runs the
/// query every time the table's generation counter moves.  Bursts of writes
/// coalesce: a slow consumer sees the latest state, not every intermediate
/// one.  The stream ends only when the consumer drops it.
pub(crate) fn watch_table<T, F>(
    db: SharedDb,
    table: Table,
    query: F,
) -> impl Stream<Item = Vec<T>> + Send
where
    T: Send + 'static,
    F: Fn(&Database) -> Result<Vec<T>, StoreError> + Send + Sync + 'static,
{
    let events = {
        let guard = db.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.events()
    };
    let rx = events.subscribe(table);
    let query = Arc::new(query);

    futures::stream::unfold((db, rx, true), move |(db, mut rx, first)| {
        let query = Arc::clone(&query);
        async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let items = {
                let guard = db.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                match query(&guard) {
                    Ok(items) => items,
                    Err(err) => {
                        tracing::warn!(error = %err, "live query failed");
                        Vec::new()
                    }
                }
            };
            Some((items, (db, rx, false)))
        }
    })
}

/// Live query over a single row, same contract as [`watch_table`]: emit the
/// current state immediately, then re-read whenever the table changes.
/// `None` means the row is absent (not yet cached, or deleted).
pub(crate) fn watch_row<T, F>(
    db: SharedDb,
    table: Table,
    query: F,
) -> impl Stream<Item = Option<T>> + Send
where
    T: Send + 'static,
    F: Fn(&Database) -> Result<Option<T>, StoreError> + Send + Sync + 'static,
{
    let events = {
        let guard = db.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.events()
    };
    let rx = events.subscribe(table);
    let query = Arc::new(query);

    futures::stream::unfold((db, rx, true), move |(db, mut rx, first)| {
        let query = Arc::clone(&query);
        async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let row = {
                let guard = db.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                match query(&guard) {
                    Ok(row) => row,
                    Err(err) => {
                        tracing::warn!(error = %err, "live row query failed");
                        None
                    }
                }
            };
            Some((row, (db, rx, false)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_contract() {
        let now = 10_000;
        assert!(is_fresh(1, None, now));
        assert!(is_fresh(9_500, Some(Duration::from_secs(1)), now));
        assert!(!is_fresh(1_000, Some(Duration::from_secs(1)), now));
        // Equal age is still fresh.
        assert!(is_fresh(9_000, Some(Duration::from_secs(1)), now));
    }

    #[test]
    fn huge_age_budget_never_flips_a_row_stale() {
        assert!(is_fresh(0, Some(Duration::MAX), i64::MAX));
        assert!(is_fresh(1, Some(Duration::from_millis(u64::MAX)), 10_000));
    }

    #[test]
    fn api_error_mapping() {
        assert_eq!(api_err(ApiError::NotFound), DataError::NotFound);
        assert_eq!(api_err(ApiError::Unauthorized), DataError::Unauthorized);
        assert_eq!(
            api_err(ApiError::Rejected("bad".to_string())),
            DataError::ServerRejected("bad".to_string())
        );
        assert!(api_err(ApiError::Status(503)).is_retryable());
        assert!(!api_err(ApiError::Status(422)).is_retryable());
        assert!(api_err(ApiError::MissingData).is_retryable());
    }
}
