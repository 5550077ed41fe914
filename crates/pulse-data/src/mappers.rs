//! Pure transformation functions between the three representations of each
//! entity: wire DTO, cache record, domain model.
//!
//! No I/O and no failure modes: mappers are total over well-formed input.
//! Enum wire values decode through the closed `from_value` lookups, so an
//! unrecognised category degrades to its documented fallback instead of
//! erroring.  List mappers are element-wise and preserve order and
//! cardinality.

use pulse_api::dto::{AlertDto, ClassifiedDto, NewsDto, UserDto};
use pulse_domain::{
    Alert, AlertSeverity, AlertType, Classified, ClassifiedCategory, Draft, DraftType, Location,
    News, NewsCategory, User,
};
use pulse_store::{AlertRecord, ClassifiedRecord, DraftRecord, NewsRecord, UserRecord};

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

/// Wire -> cache.  `fetched_at` is supplied by the caller so the function
/// stays pure.
pub fn news_to_record(dto: &NewsDto, fetched_at: i64) -> NewsRecord {
    NewsRecord {
        id: dto.id.clone(),
        title: dto.title.clone(),
        content: dto.content.clone(),
        author_id: dto.author_id.clone(),
        author_name: dto.author_name.clone(),
        image_url: dto.image_url.clone(),
        category: dto.category.clone(),
        is_verified: dto.is_verified,
        content_hash: dto.content_hash.clone(),
        likes_count: dto.likes_count,
        comments_count: dto.comments_count,
        created_at: dto.created_at,
        updated_at: dto.updated_at,
        is_synced: true,
        fetched_at,
    }
}

/// Cache -> domain.
pub fn news_record_to_domain(record: &NewsRecord) -> News {
    News {
        id: record.id.clone(),
        title: record.title.clone(),
        content: record.content.clone(),
        author_id: record.author_id.clone(),
        author_name: record.author_name.clone(),
        image_url: record.image_url.clone(),
        category: NewsCategory::from_value(&record.category),
        is_verified: record.is_verified,
        content_hash: record.content_hash.clone(),
        likes_count: record.likes_count,
        comments_count: record.comments_count,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

/// Composed wire -> domain shortcut.
pub fn news_to_domain(dto: &NewsDto, fetched_at: i64) -> News {
    news_record_to_domain(&news_to_record(dto, fetched_at))
}

pub fn news_to_records(dtos: &[NewsDto], fetched_at: i64) -> Vec<NewsRecord> {
    dtos.iter().map(|dto| news_to_record(dto, fetched_at)).collect()
}

pub fn news_records_to_domain(records: &[NewsRecord]) -> Vec<News> {
    records.iter().map(news_record_to_domain).collect()
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

pub fn alert_to_record(dto: &AlertDto, fetched_at: i64) -> AlertRecord {
    AlertRecord {
        id: dto.id.clone(),
        title: dto.title.clone(),
        description: dto.description.clone(),
        kind: dto.kind.clone(),
        severity: dto.severity,
        latitude: dto.location.as_ref().map(|l| l.latitude),
        longitude: dto.location.as_ref().map(|l| l.longitude),
        address: dto.location.as_ref().and_then(|l| l.address.clone()),
        radius_meters: dto.location.as_ref().and_then(|l| l.radius_meters),
        author_id: dto.author_id.clone(),
        is_active: dto.is_active,
        expires_at: dto.expires_at,
        created_at: dto.created_at,
        is_synced: true,
        fetched_at,
    }
}

/// Cache -> domain.  The location is rebuilt only when both coordinates are
/// present; it is never partially populated.
pub fn alert_record_to_domain(record: &AlertRecord) -> Alert {
    let location = match (record.latitude, record.longitude) {
        (Some(latitude), Some(longitude)) => Some(Location {
            latitude,
            longitude,
            address: record.address.clone(),
            radius_meters: record.radius_meters,
        }),
        _ => None,
    };
    Alert {
        id: record.id.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        kind: AlertType::from_value(&record.kind),
        severity: AlertSeverity::from_level(record.severity),
        location,
        author_id: record.author_id.clone(),
        is_active: record.is_active,
        expires_at: record.expires_at,
        created_at: record.created_at,
    }
}

pub fn alert_to_domain(dto: &AlertDto, fetched_at: i64) -> Alert {
    alert_record_to_domain(&alert_to_record(dto, fetched_at))
}

pub fn alerts_to_records(dtos: &[AlertDto], fetched_at: i64) -> Vec<AlertRecord> {
    dtos.iter().map(|dto| alert_to_record(dto, fetched_at)).collect()
}

pub fn alert_records_to_domain(records: &[AlertRecord]) -> Vec<Alert> {
    records.iter().map(alert_record_to_domain).collect()
}

pub fn alerts_to_domain(dtos: &[AlertDto], fetched_at: i64) -> Vec<Alert> {
    dtos.iter().map(|dto| alert_to_domain(dto, fetched_at)).collect()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub fn user_to_record(dto: &UserDto, is_current: bool, fetched_at: i64) -> UserRecord {
    UserRecord {
        id: dto.id.clone(),
        username: dto.username.clone(),
        display_name: dto.display_name.clone(),
        email: dto.email.clone(),
        avatar_url: dto.avatar_url.clone(),
        wallet_address: dto.wallet_address.clone(),
        token_balance: dto.token_balance,
        reputation_score: dto.reputation_score,
        is_verified: dto.is_verified,
        created_at: dto.created_at,
        is_current,
        fetched_at,
    }
}

pub fn user_record_to_domain(record: &UserRecord) -> User {
    User {
        id: record.id.clone(),
        username: record.username.clone(),
        display_name: record.display_name.clone(),
        email: record.email.clone(),
        avatar_url: record.avatar_url.clone(),
        wallet_address: record.wallet_address.clone(),
        token_balance: record.token_balance,
        reputation_score: record.reputation_score,
        is_verified: record.is_verified,
        created_at: record.created_at,
    }
}

// ---------------------------------------------------------------------------
// Classifieds
// ---------------------------------------------------------------------------

pub fn classified_to_record(dto: &ClassifiedDto, fetched_at: i64) -> ClassifiedRecord {
    ClassifiedRecord {
        id: dto.id.clone(),
        title: dto.title.clone(),
        description: dto.description.clone(),
        price: dto.price,
        currency: dto.currency.clone(),
        category: dto.category.clone(),
        images: dto.images.join(","),
        seller_id: dto.seller_id.clone(),
        seller_name: dto.seller_name.clone(),
        latitude: dto.location.as_ref().map(|l| l.latitude),
        longitude: dto.location.as_ref().map(|l| l.longitude),
        address: dto.location.as_ref().and_then(|l| l.address.clone()),
        is_active: dto.is_active,
        created_at: dto.created_at,
        is_synced: true,
        fetched_at,
    }
}

pub fn classified_record_to_domain(record: &ClassifiedRecord) -> Classified {
    let location = match (record.latitude, record.longitude) {
        (Some(latitude), Some(longitude)) => Some(Location {
            latitude,
            longitude,
            address: record.address.clone(),
            radius_meters: None,
        }),
        _ => None,
    };
    Classified {
        id: record.id.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        price: record.price,
        currency: record.currency.clone(),
        category: ClassifiedCategory::from_value(&record.category),
        images: record
            .images
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect(),
        seller_id: record.seller_id.clone(),
        seller_name: record.seller_name.clone(),
        location,
        is_active: record.is_active,
        created_at: record.created_at,
    }
}

pub fn classified_to_domain(dto: &ClassifiedDto, fetched_at: i64) -> Classified {
    classified_record_to_domain(&classified_to_record(dto, fetched_at))
}

pub fn classifieds_to_records(dtos: &[ClassifiedDto], fetched_at: i64) -> Vec<ClassifiedRecord> {
    dtos.iter()
        .map(|dto| classified_to_record(dto, fetched_at))
        .collect()
}

pub fn classified_records_to_domain(records: &[ClassifiedRecord]) -> Vec<Classified> {
    records.iter().map(classified_record_to_domain).collect()
}

// ---------------------------------------------------------------------------
// Drafts (local-only, both directions)
// ---------------------------------------------------------------------------

pub fn draft_record_to_domain(record: &DraftRecord) -> Draft {
    Draft {
        id: record.id,
        kind: DraftType::from_value(&record.kind),
        title: record.title.clone(),
        content: record.content.clone(),
        category: record.category.clone(),
        image_url: record.image_url.clone(),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

pub fn draft_to_record(draft: &Draft) -> DraftRecord {
    DraftRecord {
        id: draft.id,
        kind: draft.kind.value().to_string(),
        title: draft.title.clone(),
        content: draft.content.clone(),
        category: draft.category.clone(),
        image_url: draft.image_url.clone(),
        created_at: draft.created_at,
        updated_at: draft.updated_at,
    }
}

pub fn draft_records_to_domain(records: &[DraftRecord]) -> Vec<Draft> {
    records.iter().map(draft_record_to_domain).collect()
}
