use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pulse_api::{ApiConfig, PulseApi};
use pulse_domain::{AlertSeverity, AlertType, DataError, Draft, DraftType, NewsCategory};
use pulse_store::{now_millis, Database, NewsRecord};

use pulse_data::{
    AlertRepository, DraftRepository, NewsRepository, OutboxDrainer, SharedDb, UserRepository,
};

fn open_db() -> (tempfile::TempDir, SharedDb) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("test.db")).unwrap();
    (dir, Arc::new(Mutex::new(db)))
}

fn client_for(server: &MockServer) -> PulseApi {
    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    PulseApi::new(&config).unwrap()
}

/// A client whose every request fails at the transport layer.
fn unreachable_client() -> PulseApi {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_millis(500),
    };
    PulseApi::new(&config).unwrap()
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "success": true, "data": data, "message": null, "error": null })
}

fn news_json(id: &str, category: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Bridge reopened",
        "content": "The footbridge is open again",
        "author_id": "u1",
        "author_name": "County Desk",
        "image_url": null,
        "category": category,
        "is_verified": true,
        "content_hash": null,
        "likes_count": 2,
        "comments_count": 0,
        "created_at": 1_700_000_000_000i64,
        "updated_at": 1_700_000_000_000i64
    })
}

fn news_page(items: Vec<serde_json::Value>) -> serde_json::Value {
    let total = items.len();
    envelope(json!({
        "items": items,
        "page": 1,
        "total_pages": 1,
        "total_items": total
    }))
}

fn alert_json(id: &str, is_active: bool, expires_at: Option<i64>) -> serde_json::Value {
    json!({
        "id": id,
        "title": "High winds",
        "description": "Gusts expected tonight",
        "type": "warning",
        "severity": 3,
        "location": null,
        "author_id": "u2",
        "is_active": is_active,
        "expires_at": expires_at,
        "created_at": 1_700_000_000_000i64
    })
}

fn cached_news(id: &str, fetched_at: i64) -> NewsRecord {
    NewsRecord {
        id: id.to_string(),
        title: "Old headline".to_string(),
        content: "Old body".to_string(),
        author_id: "u1".to_string(),
        author_name: "County Desk".to_string(),
        image_url: None,
        category: "local".to_string(),
        is_verified: false,
        content_hash: None,
        likes_count: 0,
        comments_count: 0,
        created_at: 1_600_000_000_000,
        updated_at: 1_600_000_000_000,
        is_synced: true,
        fetched_at,
    }
}

// ---------------------------------------------------------------------------
// Cache-first reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn miss_fetches_remote_then_serves_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(news_json("n1", "local"))))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    let repo = NewsRepository::new(client_for(&server), db.clone());

    let first = repo.get_by_id("n1", None).await.unwrap();
    assert_eq!(first.id, "n1");
    assert_eq!(first.category, NewsCategory::Local);

    // Second read must not hit the server; the mock's expect(1) enforces it.
    let second = repo.get_by_id("n1", None).await.unwrap();
    assert_eq!(second, first);

    let cached = db.lock().unwrap().get_news_by_id("n1").unwrap().unwrap();
    assert!(cached.is_synced);
}

#[tokio::test]
async fn remote_not_found_propagates_and_leaves_cache_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    let repo = NewsRepository::new(client_for(&server), db.clone());

    assert!(matches!(
        repo.get_by_id("ghost", None).await,
        Err(DataError::NotFound)
    ));
    assert!(db.lock().unwrap().get_news_by_id("ghost").unwrap().is_none());
}

#[tokio::test]
async fn stale_row_is_treated_as_a_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(news_json("n1", "local"))))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    // Fetched an hour ago.
    let stale = cached_news("n1", now_millis() - 3_600_000);
    db.lock().unwrap().upsert_news(&stale).unwrap();

    let repo = NewsRepository::new(client_for(&server), db.clone());

    // Trusting any age serves the stale row without touching the network.
    let trusted = repo.get_by_id("n1", None).await.unwrap();
    assert_eq!(trusted.title, "Old headline");

    // A one-minute budget forces the refetch.
    let fresh = repo
        .get_by_id("n1", Some(Duration::from_secs(60)))
        .await
        .unwrap();
    assert_eq!(fresh.title, "Bridge reopened");
}

#[tokio::test]
async fn stale_row_with_unreachable_server_propagates_transport() {
    let (_dir, db) = open_db();
    db.lock()
        .unwrap()
        .upsert_news(&cached_news("n1", now_millis() - 3_600_000))
        .unwrap();

    let repo = NewsRepository::new(unreachable_client(), db);
    let err = repo
        .get_by_id("n1", Some(Duration::from_secs(60)))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

// ---------------------------------------------------------------------------
// Refresh and tombstoning
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_tombstones_rows_the_server_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_page(vec![news_json("n1", "local")])))
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    {
        let store = db.lock().unwrap();
        store.upsert_news(&cached_news("n1", 1)).unwrap();
        store.upsert_news(&cached_news("n2", 1)).unwrap();
        let mut provisional = cached_news("local-abc", 1);
        provisional.is_synced = false;
        store.upsert_news(&provisional).unwrap();
    }

    let repo = NewsRepository::new(client_for(&server), db.clone());
    let fetched = repo.refresh(None).await.unwrap();
    assert_eq!(fetched, 1);

    let store = db.lock().unwrap();
    assert!(store.get_news_by_id("n1").unwrap().is_some());
    // Dropped by the server, gone from the cache.
    assert!(store.get_news_by_id("n2").unwrap().is_none());
    // Unsynced rows survive reconciliation.
    assert!(store.get_news_by_id("local-abc").unwrap().is_some());
}

#[tokio::test]
async fn alert_refresh_deactivates_expired_rows() {
    let server = MockServer::start().await;
    let expired = now_millis() - 60_000;
    Mock::given(method("GET"))
        .and(path("/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "items": [alert_json("a1", true, Some(expired))],
            "page": 1,
            "total_pages": 1,
            "total_items": 1
        }))))
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    let repo = AlertRepository::new(client_for(&server), db.clone());
    repo.refresh().await.unwrap();

    let cached = db.lock().unwrap().get_alert_by_id("a1").unwrap().unwrap();
    assert!(!cached.is_active);
}

// ---------------------------------------------------------------------------
// Offline creates and the outbox
// ---------------------------------------------------------------------------

#[tokio::test]
async fn offline_create_queues_and_returns_provisional() {
    let (_dir, db) = open_db();
    let repo = NewsRepository::new(unreachable_client(), db.clone());

    let news = repo
        .create(
            "Pipe burst".to_string(),
            "Water off on 5th street".to_string(),
            NewsCategory::Local,
            None,
        )
        .await
        .unwrap();

    assert!(news.id.starts_with("local-"));

    let store = db.lock().unwrap();
    let cached = store.get_news_by_id(&news.id).unwrap().unwrap();
    assert!(!cached.is_synced);

    let queue = store.list_outbox().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].operation, "create_news");
    assert_eq!(queue[0].provisional_id.as_deref(), Some(news.id.as_str()));
}

#[tokio::test]
async fn online_create_is_readable_without_another_fetch() {
    let server = MockServer::start().await;
    // Only the create is mocked; the follow-up read must come from the cache.
    Mock::given(method("POST"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(news_json("n9", "local"))))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    let repo = NewsRepository::new(client_for(&server), db);

    let created = repo
        .create(
            "Bridge reopened".to_string(),
            "The footbridge is open again".to_string(),
            NewsCategory::Local,
            None,
        )
        .await
        .unwrap();
    assert_eq!(created.id, "n9");

    let read_back = repo.get_by_id("n9", None).await.unwrap();
    assert_eq!(read_back, created);
}

#[tokio::test]
async fn rejected_create_fails_without_queueing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": null,
            "message": null,
            "error": "title too long"
        })))
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    let repo = NewsRepository::new(client_for(&server), db.clone());

    let err = repo
        .create("t".repeat(500), "c".to_string(), NewsCategory::Local, None)
        .await
        .unwrap_err();
    assert_eq!(err, DataError::ServerRejected("title too long".to_string()));
    assert!(db.lock().unwrap().list_outbox().unwrap().is_empty());
}

#[tokio::test]
async fn drain_swaps_provisional_for_canonical() {
    let (_dir, db) = open_db();

    let offline = NewsRepository::new(unreachable_client(), db.clone());
    let provisional = offline
        .create(
            "Pipe burst".to_string(),
            "Water off on 5th street".to_string(),
            NewsCategory::Local,
            None,
        )
        .await
        .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(news_json("n9", "local"))))
        .expect(1)
        .mount(&server)
        .await;

    let drainer = OutboxDrainer::new(client_for(&server), db.clone());
    let report = drainer.drain().await.unwrap();
    assert_eq!(report.drained, 1);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.remaining, 0);

    let store = db.lock().unwrap();
    assert!(store.get_news_by_id(&provisional.id).unwrap().is_none());
    assert!(store.get_news_by_id("n9").unwrap().is_some());
    assert!(store.list_outbox().unwrap().is_empty());
}

#[tokio::test]
async fn drain_pauses_on_transport_failure() {
    let (_dir, db) = open_db();
    let offline = NewsRepository::new(unreachable_client(), db.clone());
    offline
        .create("a".to_string(), "b".to_string(), NewsCategory::Local, None)
        .await
        .unwrap();

    let drainer = OutboxDrainer::new(unreachable_client(), db.clone());
    let report = drainer.drain().await.unwrap();
    assert_eq!(report.drained, 0);
    assert_eq!(report.remaining, 1);

    let queue = db.lock().unwrap().list_outbox().unwrap();
    assert_eq!(queue[0].attempts, 1);
    assert!(queue[0].last_error.is_some());
}

#[tokio::test]
async fn drain_drops_permanently_rejected_entries() {
    let (_dir, db) = open_db();
    let offline = NewsRepository::new(unreachable_client(), db.clone());
    let provisional = offline
        .create("a".to_string(), "b".to_string(), NewsCategory::Local, None)
        .await
        .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": null,
            "message": null,
            "error": "duplicate content"
        })))
        .mount(&server)
        .await;

    let drainer = OutboxDrainer::new(client_for(&server), db.clone());
    let report = drainer.drain().await.unwrap();
    assert_eq!(report.dropped, 1);
    assert_eq!(report.remaining, 0);

    let store = db.lock().unwrap();
    // The phantom post disappears with its queue entry.
    assert!(store.get_news_by_id(&provisional.id).unwrap().is_none());
    assert!(store.list_outbox().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Alert creation with provisional fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn offline_alert_create_is_active_and_queued() {
    let (_dir, db) = open_db();
    let repo = AlertRepository::new(unreachable_client(), db.clone());

    let alert = repo
        .create(
            "Flooding".to_string(),
            "River past the bank".to_string(),
            AlertType::Emergency,
            AlertSeverity::Critical,
            None,
        )
        .await
        .unwrap();

    assert!(alert.id.starts_with("local-"));
    assert!(alert.is_active);
    assert_eq!(alert.severity, AlertSeverity::Critical);

    let queue = db.lock().unwrap().list_outbox().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].operation, "create_alert");
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

fn user_json(id: &str, balance: i64) -> serde_json::Value {
    json!({
        "id": id,
        "username": "asha",
        "display_name": "Asha",
        "email": null,
        "avatar_url": null,
        "wallet_address": null,
        "token_balance": balance,
        "reputation_score": 5,
        "is_verified": true,
        "created_at": 1_700_000_000_000i64
    })
}

#[tokio::test]
async fn current_user_refreshes_then_rereads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(user_json("u1", 10))))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    let repo = UserRepository::new(client_for(&server), db.clone());

    let user = repo.current(None).await.unwrap();
    assert_eq!(user.id, "u1");

    // Marker row installed; second call is served locally.
    let again = repo.current(None).await.unwrap();
    assert_eq!(again, user);
    let cached = db.lock().unwrap().get_current_user().unwrap().unwrap();
    assert!(cached.is_current);
}

#[tokio::test]
async fn token_balance_falls_back_to_cache_when_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(user_json("u1", 42))))
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    let online = UserRepository::new(client_for(&server), db.clone());
    online.current(None).await.unwrap();

    let offline = UserRepository::new(unreachable_client(), db.clone());
    assert_eq!(offline.token_balance().await.unwrap(), 42);
}

#[tokio::test]
async fn logout_clears_cached_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(user_json("u1", 10))))
        .mount(&server)
        .await;

    let (_dir, db) = open_db();
    let repo = UserRepository::new(client_for(&server), db.clone());
    repo.current(None).await.unwrap();

    repo.logout().await.unwrap();
    assert!(db.lock().unwrap().get_current_user().unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Live queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn watch_emits_current_state_then_updates() {
    let server = MockServer::start().await;
    let (_dir, db) = open_db();
    let repo = NewsRepository::new(client_for(&server), db.clone());

    let mut stream = Box::pin(repo.watch_all());
    assert!(stream.next().await.unwrap().is_empty());

    db.lock().unwrap().upsert_news(&cached_news("n1", 1)).unwrap();

    let updated = stream.next().await.unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].id, "n1");
}

#[tokio::test]
async fn watch_by_id_tracks_one_row_through_insert_and_delete() {
    let server = MockServer::start().await;
    let (_dir, db) = open_db();
    let repo = NewsRepository::new(client_for(&server), db.clone());

    let mut stream = Box::pin(repo.watch_by_id("n1"));
    assert!(stream.next().await.unwrap().is_none());

    db.lock().unwrap().upsert_news(&cached_news("n1", 1)).unwrap();
    let present = stream.next().await.unwrap().unwrap();
    assert_eq!(present.id, "n1");

    db.lock().unwrap().delete_news("n1").unwrap();
    assert!(stream.next().await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn draft_lifecycle() {
    let (_dir, db) = open_db();
    let repo = DraftRepository::new(db);

    let id = repo
        .save(Draft {
            id: 0,
            kind: DraftType::News,
            title: "Half-written".to_string(),
            content: "…".to_string(),
            category: Some("local".to_string()),
            image_url: None,
            created_at: 0,
            updated_at: 0,
        })
        .await
        .unwrap();
    assert!(id > 0);

    let loaded = repo.get_by_id(id).await.unwrap();
    assert_eq!(loaded.title, "Half-written");
    assert!(loaded.created_at > 0);

    repo.delete(id).await.unwrap();
    assert!(matches!(
        repo.get_by_id(id).await,
        Err(DataError::NotFound)
    ));
}
