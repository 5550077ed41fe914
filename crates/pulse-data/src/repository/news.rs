//! Cache-first access to news articles.

use std::time::Duration;

use futures::Stream;
use pulse_api::dto::CreateNewsRequest;
use pulse_api::PulseApi;
use pulse_domain::{DataError, News, NewsCategory};
use pulse_store::{now_millis, NewsRecord, Table};

use crate::mappers::{news_record_to_domain, news_records_to_domain, news_to_record, news_to_records};
use crate::outbox::PendingOp;
use crate::repository::{
    api_err, is_fresh, lock, store_err, watch_row, watch_table, SharedDb, DEFAULT_PAGE_SIZE,
};

#[derive(Clone)]
pub struct NewsRepository {
    api: PulseApi,
    db: SharedDb,
}

impl NewsRepository {
    pub fn new(api: PulseApi, db: SharedDb) -> Self {
        Self { api, db }
    }

    /// Live view of every cached article, newest first.  Never touches the
    /// network; pair with [`NewsRepository::refresh`] for freshness.
    pub fn watch_all(&self) -> impl Stream<Item = Vec<News>> + Send {
        watch_table(self.db.clone(), Table::News, |db| {
            db.list_news(None).map(|records| news_records_to_domain(&records))
        })
    }

    /// Live view filtered to one category.
    pub fn watch_by_category(&self, category: NewsCategory) -> impl Stream<Item = Vec<News>> + Send {
        watch_table(self.db.clone(), Table::News, move |db| {
            db.list_news(Some(category.value()))
                .map(|records| news_records_to_domain(&records))
        })
    }

    /// Live view of one article.  `None` while the row is absent; emits again
    /// on every change to the news table, including the provisional-to-
    /// canonical swap after an outbox drain.
    pub fn watch_by_id(&self, id: &str) -> impl Stream<Item = Option<News>> + Send {
        let id = id.to_string();
        watch_row(self.db.clone(), Table::News, move |db| {
            Ok(db.get_news_by_id(&id)?.map(|record| news_record_to_domain(&record)))
        })
    }

    /// Read one article, cache first.
    ///
    /// A cached row older than `max_age` is treated as a miss; `None` trusts
    /// any cached row.  On a miss the remote copy is fetched and mirrored into
    /// the cache before being returned.
    pub async fn get_by_id(&self, id: &str, max_age: Option<Duration>) -> Result<News, DataError> {
        let now = now_millis();
        let cached = lock(&self.db)?.get_news_by_id(id).map_err(store_err)?;
        if let Some(record) = cached {
            if is_fresh(record.fetched_at, max_age, now) {
                return Ok(news_record_to_domain(&record));
            }
        }

        let dto = self.api.get_news_by_id(id).await.map_err(api_err)?;
        let record = news_to_record(&dto, now_millis());
        lock(&self.db)?.upsert_news(&record).map_err(store_err)?;
        Ok(news_record_to_domain(&record))
    }

    /// Publish an article.
    ///
    /// On success the server's copy lands in the cache.  On a retryable
    /// failure the write is queued in the outbox and a provisional article
    /// (id `local-…`, unsynced) is cached and returned, so the author sees
    /// their post immediately.  Non-retryable failures surface as-is.
    pub async fn create(
        &self,
        title: String,
        content: String,
        category: NewsCategory,
        image_url: Option<String>,
    ) -> Result<News, DataError> {
        let request = CreateNewsRequest {
            title,
            content,
            category: category.value().to_string(),
            image_url,
        };

        match self.api.create_news(&request, None).await {
            Ok(dto) => {
                let record = news_to_record(&dto, now_millis());
                lock(&self.db)?.upsert_news(&record).map_err(store_err)?;
                Ok(news_record_to_domain(&record))
            }
            Err(err) => {
                let err = api_err(err);
                if !err.is_retryable() {
                    return Err(err);
                }
                self.queue_create(request).await
            }
        }
    }

    async fn queue_create(&self, request: CreateNewsRequest) -> Result<News, DataError> {
        let now = now_millis();
        let provisional_id = format!("local-{}", uuid::Uuid::new_v4());
        let idempotency_key = uuid::Uuid::new_v4().to_string();

        let author = lock(&self.db)?.get_current_user().map_err(store_err)?;
        let (author_id, author_name) = author
            .map(|user| (user.id, user.display_name))
            .unwrap_or_default();

        let record = NewsRecord {
            id: provisional_id.clone(),
            title: request.title.clone(),
            content: request.content.clone(),
            author_id,
            author_name,
            image_url: request.image_url.clone(),
            category: request.category.clone(),
            is_verified: false,
            content_hash: None,
            likes_count: 0,
            comments_count: 0,
            created_at: now,
            updated_at: now,
            is_synced: false,
            fetched_at: now,
        };

        let op = PendingOp::CreateNews { request };
        let payload =
            serde_json::to_string(&op).map_err(|err| DataError::Storage(err.to_string()))?;
        {
            let db = lock(&self.db)?;
            db.upsert_news(&record).map_err(store_err)?;
            db.enqueue_outbox(&idempotency_key, op.tag(), &payload, Some(&provisional_id))
                .map_err(store_err)?;
        }
        tracing::info!(id = %provisional_id, "news create queued for replay");
        Ok(news_record_to_domain(&record))
    }

    /// Like an article.  Remote-first; the cached copy is re-fetched on
    /// success so counters stay consistent, best effort.
    pub async fn like(&self, id: &str) -> Result<(), DataError> {
        self.api.like_news(id).await.map_err(api_err)?;
        match self.api.get_news_by_id(id).await {
            Ok(dto) => {
                let record = news_to_record(&dto, now_millis());
                lock(&self.db)?.upsert_news(&record).map_err(store_err)?;
            }
            Err(err) => tracing::debug!(id, error = %err, "post-like refetch failed"),
        }
        Ok(())
    }

    /// Delete an article.  The cached row goes only after the server accepts.
    pub async fn delete(&self, id: &str) -> Result<(), DataError> {
        self.api.delete_news(id).await.map_err(api_err)?;
        lock(&self.db)?.delete_news(id).map_err(store_err)?;
        Ok(())
    }

    /// Reconcile the cache with the server.
    ///
    /// Walks every page of the (optionally category-scoped) listing, mirrors
    /// the rows into the cache, then tombstones synced rows in the same scope
    /// that the server no longer returns.  Provisional rows are spared.
    /// Returns the number of articles fetched.
    pub async fn refresh(&self, category: Option<NewsCategory>) -> Result<usize, DataError> {
        let scope = category.map(|c| c.value());
        let mut page = 1;
        let mut keep = Vec::new();
        let mut fetched = 0;

        loop {
            let batch = self
                .api
                .get_news(page, DEFAULT_PAGE_SIZE, scope)
                .await
                .map_err(api_err)?;
            let records = news_to_records(&batch.items, now_millis());
            keep.extend(records.iter().map(|r| r.id.clone()));
            fetched += records.len();
            lock(&self.db)?.upsert_news_batch(&records).map_err(store_err)?;

            if batch.items.is_empty() || page >= batch.total_pages {
                break;
            }
            page += 1;
        }

        let removed = lock(&self.db)?.retain_news(scope, &keep).map_err(store_err)?;
        tracing::debug!(fetched, removed, "news cache reconciled");
        Ok(fetched)
    }
}
