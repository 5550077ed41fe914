//! # pulse-data
//!
//! The offline-first data layer: mappers between wire DTOs, cache records and
//! domain models; one repository per entity family orchestrating cache-first
//! reads, remote refresh and write-through; the outbox drainer for offline
//! creates; and the thin use-case façades the presentation layer calls.
//!
//! Repositories are the sole authority on cache-vs-remote: a read-by-id
//! consults the cache first (subject to an optional caller-supplied max-age),
//! falls back to the network on a miss, and mirrors remote successes into the
//! cache.  Collection reads are live streams over the cache and never touch
//! the network; freshness is the caller's job via the explicit `refresh`
//! operations.

pub mod mappers;
pub mod outbox;
pub mod repository;
pub mod usecases;

pub use outbox::{DrainReport, OutboxDrainer, PendingOp};
pub use repository::{
    AlertRepository, ClassifiedRepository, DraftRepository, NewsRepository, SharedDb,
    UserRepository, DEFAULT_PAGE_SIZE,
};
