//! One-operation façades over the repositories.
//!
//! Each use case is a cheap, clonable handle wrapping exactly one repository
//! call, so a presentation layer can depend on the single operation it needs
//! instead of a whole repository.  No policy lives here.

use std::time::Duration;

use futures::Stream;
use pulse_domain::{
    Alert, AlertSeverity, AlertType, Classified, ClassifiedCategory, DataError, Draft, DraftType,
    Location, News, NewsCategory, User,
};

use crate::outbox::{DrainReport, OutboxDrainer};
use crate::repository::{
    AlertRepository, ClassifiedRepository, DraftRepository, NewsRepository, UserRepository,
};

macro_rules! use_case {
    ($(#[$meta:meta])* $name:ident, $repo:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            repo: $repo,
        }

        impl $name {
            pub fn new(repo: $repo) -> Self {
                Self { repo }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

use_case!(
    /// Live feed of news, optionally scoped to one category.
    ObserveNews,
    NewsRepository
);

impl ObserveNews {
    pub fn run(&self, category: Option<NewsCategory>) -> impl Stream<Item = Vec<News>> + Send {
        match category {
            Some(category) => futures::future::Either::Left(self.repo.watch_by_category(category)),
            None => futures::future::Either::Right(self.repo.watch_all()),
        }
    }
}

use_case!(
    /// Live view of one article, `None` while it is absent from the cache.
    ObserveNewsById,
    NewsRepository
);

impl ObserveNewsById {
    pub fn run(&self, id: &str) -> impl Stream<Item = Option<News>> + Send {
        self.repo.watch_by_id(id)
    }
}

use_case!(GetNewsById, NewsRepository);

impl GetNewsById {
    pub async fn run(&self, id: &str, max_age: Option<Duration>) -> Result<News, DataError> {
        self.repo.get_by_id(id, max_age).await
    }
}

use_case!(CreateNews, NewsRepository);

impl CreateNews {
    pub async fn run(
        &self,
        title: String,
        content: String,
        category: NewsCategory,
        image_url: Option<String>,
    ) -> Result<News, DataError> {
        self.repo.create(title, content, category, image_url).await
    }
}

use_case!(LikeNews, NewsRepository);

impl LikeNews {
    pub async fn run(&self, id: &str) -> Result<(), DataError> {
        self.repo.like(id).await
    }
}

use_case!(DeleteNews, NewsRepository);

impl DeleteNews {
    pub async fn run(&self, id: &str) -> Result<(), DataError> {
        self.repo.delete(id).await
    }
}

use_case!(RefreshNews, NewsRepository);

impl RefreshNews {
    pub async fn run(&self, category: Option<NewsCategory>) -> Result<usize, DataError> {
        self.repo.refresh(category).await
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

use_case!(
    /// Live feed of alerts still marked active.
    ObserveActiveAlerts,
    AlertRepository
);

impl ObserveActiveAlerts {
    pub fn run(&self) -> impl Stream<Item = Vec<Alert>> + Send {
        self.repo.watch_active()
    }
}

use_case!(ObserveAlertById, AlertRepository);

impl ObserveAlertById {
    pub fn run(&self, id: &str) -> impl Stream<Item = Option<Alert>> + Send {
        self.repo.watch_by_id(id)
    }
}

use_case!(GetAlertById, AlertRepository);

impl GetAlertById {
    pub async fn run(&self, id: &str, max_age: Option<Duration>) -> Result<Alert, DataError> {
        self.repo.get_by_id(id, max_age).await
    }
}

use_case!(CreateAlert, AlertRepository);

impl CreateAlert {
    pub async fn run(
        &self,
        title: String,
        description: String,
        kind: AlertType,
        severity: AlertSeverity,
        location: Option<Location>,
    ) -> Result<Alert, DataError> {
        self.repo.create(title, description, kind, severity, location).await
    }
}

use_case!(GetNearbyAlerts, AlertRepository);

impl GetNearbyAlerts {
    pub async fn run(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: u32,
    ) -> Result<Vec<Alert>, DataError> {
        self.repo.nearby(latitude, longitude, radius_km).await
    }
}

use_case!(RefreshAlerts, AlertRepository);

impl RefreshAlerts {
    pub async fn run(&self) -> Result<usize, DataError> {
        self.repo.refresh().await
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

use_case!(GetCurrentUser, UserRepository);

impl GetCurrentUser {
    pub async fn run(&self, max_age: Option<Duration>) -> Result<User, DataError> {
        self.repo.current(max_age).await
    }
}

use_case!(ObserveUserById, UserRepository);

impl ObserveUserById {
    pub fn run(&self, id: &str) -> impl Stream<Item = Option<User>> + Send {
        self.repo.watch_by_id(id)
    }
}

use_case!(GetUserById, UserRepository);

impl GetUserById {
    pub async fn run(&self, id: &str, max_age: Option<Duration>) -> Result<User, DataError> {
        self.repo.get_by_id(id, max_age).await
    }
}

use_case!(UpdateProfile, UserRepository);

impl UpdateProfile {
    pub async fn run(
        &self,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<User, DataError> {
        self.repo.update_profile(display_name, avatar_url).await
    }
}

use_case!(GetTokenBalance, UserRepository);

impl GetTokenBalance {
    pub async fn run(&self) -> Result<i64, DataError> {
        self.repo.token_balance().await
    }
}

use_case!(GetTransactions, UserRepository);

impl GetTransactions {
    pub async fn run(&self, page: u32, limit: u32) -> Result<Vec<serde_json::Value>, DataError> {
        self.repo.transactions(page, limit).await
    }
}

use_case!(Logout, UserRepository);

impl Logout {
    pub async fn run(&self) -> Result<(), DataError> {
        self.repo.logout().await
    }
}

// ---------------------------------------------------------------------------
// Classifieds
// ---------------------------------------------------------------------------

use_case!(
    /// Live feed of active listings, optionally scoped to one category.
    ObserveClassifieds,
    ClassifiedRepository
);

impl ObserveClassifieds {
    pub fn run(
        &self,
        category: Option<ClassifiedCategory>,
    ) -> impl Stream<Item = Vec<Classified>> + Send {
        match category {
            Some(category) => futures::future::Either::Left(self.repo.watch_by_category(category)),
            None => futures::future::Either::Right(self.repo.watch_active()),
        }
    }
}

use_case!(GetClassifiedById, ClassifiedRepository);

impl GetClassifiedById {
    pub async fn run(&self, id: &str, max_age: Option<Duration>) -> Result<Classified, DataError> {
        self.repo.get_by_id(id, max_age).await
    }
}

use_case!(RefreshClassifieds, ClassifiedRepository);

impl RefreshClassifieds {
    pub async fn run(&self, category: Option<ClassifiedCategory>) -> Result<usize, DataError> {
        self.repo.refresh(category).await
    }
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

use_case!(ObserveDrafts, DraftRepository);

impl ObserveDrafts {
    pub fn run(&self, kind: Option<DraftType>) -> impl Stream<Item = Vec<Draft>> + Send {
        match kind {
            Some(kind) => futures::future::Either::Left(self.repo.watch_by_kind(kind)),
            None => futures::future::Either::Right(self.repo.watch_all()),
        }
    }
}

use_case!(GetDraftById, DraftRepository);

impl GetDraftById {
    pub async fn run(&self, id: i64) -> Result<Draft, DataError> {
        self.repo.get_by_id(id).await
    }
}

use_case!(SaveDraft, DraftRepository);

impl SaveDraft {
    pub async fn run(&self, draft: Draft) -> Result<i64, DataError> {
        self.repo.save(draft).await
    }
}

use_case!(DeleteDraft, DraftRepository);

impl DeleteDraft {
    pub async fn run(&self, id: i64) -> Result<(), DataError> {
        self.repo.delete(id).await
    }
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

use_case!(
    /// One replay pass over queued offline writes.
    SyncPendingWrites,
    OutboxDrainer
);

impl SyncPendingWrites {
    pub async fn run(&self) -> Result<DrainReport, DataError> {
        self.repo.drain().await
    }
}
