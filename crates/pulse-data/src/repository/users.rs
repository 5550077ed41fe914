//! Cache-first access to user profiles and the session's current user.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::Stream;
use pulse_api::PulseApi;
use pulse_domain::{DataError, User};
use pulse_store::{now_millis, Table};

use crate::mappers::{user_record_to_domain, user_to_record};
use crate::repository::{api_err, is_fresh, lock, store_err, watch_row, watch_table, SharedDb};

#[derive(Clone)]
pub struct UserRepository {
    api: PulseApi,
    db: SharedDb,
}

impl UserRepository {
    pub fn new(api: PulseApi, db: SharedDb) -> Self {
        Self { api, db }
    }

    /// Live view of the current-user row.  Emits a one-element vec while a
    /// session is cached, an empty vec after logout.
    pub fn watch_current(&self) -> impl Stream<Item = Vec<User>> + Send {
        watch_table(self.db.clone(), Table::Users, |db| {
            Ok(db
                .get_current_user()?
                .map(|record| vec![user_record_to_domain(&record)])
                .unwrap_or_default())
        })
    }

    /// Live view of one profile, `None` while the row is absent.
    pub fn watch_by_id(&self, id: &str) -> impl Stream<Item = Option<User>> + Send {
        let id = id.to_string();
        watch_row(self.db.clone(), Table::Users, move |db| {
            Ok(db.get_user_by_id(&id)?.map(|record| user_record_to_domain(&record)))
        })
    }

    /// The signed-in user.
    ///
    /// Serves the cached marker row when fresh enough; otherwise refreshes
    /// from `GET /users/me` and re-reads.  With no cached row and no network
    /// the session is effectively signed out and the error propagates.
    pub async fn current(&self, max_age: Option<Duration>) -> Result<User, DataError> {
        let now = now_millis();
        let cached = lock(&self.db)?.get_current_user().map_err(store_err)?;
        if let Some(record) = cached {
            if is_fresh(record.fetched_at, max_age, now) {
                return Ok(user_record_to_domain(&record));
            }
        }
        self.refresh_current().await
    }

    /// Fetch `GET /users/me` and install the result as the current user,
    /// clearing any previous marker.
    pub async fn refresh_current(&self) -> Result<User, DataError> {
        let dto = self.api.get_current_user().await.map_err(api_err)?;
        let record = user_to_record(&dto, true, now_millis());
        lock(&self.db)?.upsert_user(&record).map_err(store_err)?;
        Ok(user_record_to_domain(&record))
    }

    /// Read any profile by id, cache first.
    pub async fn get_by_id(&self, id: &str, max_age: Option<Duration>) -> Result<User, DataError> {
        let now = now_millis();
        let cached = lock(&self.db)?.get_user_by_id(id).map_err(store_err)?;
        if let Some(record) = cached {
            if is_fresh(record.fetched_at, max_age, now) {
                return Ok(user_record_to_domain(&record));
            }
        }

        let dto = self.api.get_user_by_id(id).await.map_err(api_err)?;
        // A profile fetched by id keeps its current-user marker if it is the
        // signed-in user.
        let is_current = lock(&self.db)?
            .get_current_user()
            .map_err(store_err)?
            .is_some_and(|current| current.id == dto.id);
        let record = user_to_record(&dto, is_current, now_millis());
        lock(&self.db)?.upsert_user(&record).map_err(store_err)?;
        Ok(user_record_to_domain(&record))
    }

    /// Update the signed-in user's profile.  Only the provided fields change;
    /// the server's authoritative copy replaces the cached row.
    pub async fn update_profile(
        &self,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<User, DataError> {
        let mut updates = BTreeMap::new();
        if let Some(display_name) = display_name {
            updates.insert("display_name".to_string(), display_name);
        }
        if let Some(avatar_url) = avatar_url {
            updates.insert("avatar_url".to_string(), avatar_url);
        }
        if updates.is_empty() {
            return Err(DataError::Validation("no profile fields to update".to_string()));
        }

        let dto = self.api.update_profile(&updates).await.map_err(api_err)?;
        let record = user_to_record(&dto, true, now_millis());
        lock(&self.db)?.upsert_user(&record).map_err(store_err)?;
        Ok(user_record_to_domain(&record))
    }

    /// The signed-in user's token balance, remote first with a cached
    /// fallback when the server is unreachable.
    pub async fn token_balance(&self) -> Result<i64, DataError> {
        match self.api.get_token_balance().await {
            Ok(balance) => {
                lock(&self.db)?.update_token_balance(balance).map_err(store_err)?;
                Ok(balance)
            }
            Err(err) => {
                let err = api_err(err);
                if !err.is_retryable() {
                    return Err(err);
                }
                let cached = lock(&self.db)?.get_current_user().map_err(store_err)?;
                match cached {
                    Some(record) => {
                        tracing::debug!("serving cached token balance");
                        Ok(record.token_balance)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Recent wallet transactions, untyped.  Not cached.
    pub async fn transactions(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Vec<serde_json::Value>, DataError> {
        let batch = self.api.get_transactions(page, limit).await.map_err(api_err)?;
        Ok(batch.items)
    }

    /// End the session: drop the stored token pair and every cached profile.
    pub async fn logout(&self) -> Result<(), DataError> {
        self.api.tokens().clear();
        lock(&self.db)?.clear_all_users().map_err(store_err)?;
        tracing::info!("session cleared");
        Ok(())
    }
}
