//! Table-level change notification.
//!
//! Each cache table has a generation counter behind a [`tokio::sync::watch`]
//! channel.  Every write helper bumps the counter for its table; live-query
//! consumers subscribe and re-run their query whenever the generation moves.
//! The payload is only a counter -- subscribers always re-read the cache, so a
//! slow consumer coalesces bursts of writes instead of buffering them.

use std::sync::Arc;

use tokio::sync::watch;

/// Cache tables that can be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    News,
    Alerts,
    Users,
    Classifieds,
    Drafts,
    Outbox,
}

struct Inner {
    news: watch::Sender<u64>,
    alerts: watch::Sender<u64>,
    users: watch::Sender<u64>,
    classifieds: watch::Sender<u64>,
    drafts: watch::Sender<u64>,
    outbox: watch::Sender<u64>,
}

/// Cloneable handle to the per-table generation counters.
#[derive(Clone)]
pub struct TableEvents {
    inner: Arc<Inner>,
}

impl TableEvents {
    pub fn new() -> Self {
        let channel = || watch::channel(0).0;
        Self {
            inner: Arc::new(Inner {
                news: channel(),
                alerts: channel(),
                users: channel(),
                classifieds: channel(),
                drafts: channel(),
                outbox: channel(),
            }),
        }
    }

    fn sender(&self, table: Table) -> &watch::Sender<u64> {
        match table {
            Table::News => &self.inner.news,
            Table::Alerts => &self.inner.alerts,
            Table::Users => &self.inner.users,
            Table::Classifieds => &self.inner.classifieds,
            Table::Drafts => &self.inner.drafts,
            Table::Outbox => &self.inner.outbox,
        }
    }

    /// Subscribe to generation bumps for one table.
    pub fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.sender(table).subscribe()
    }

    /// Record that a table changed.  Never blocks; dropped receivers are fine.
    pub fn bump(&self, table: Table) {
        self.sender(table).send_modify(|generation| *generation += 1);
    }
}

impl Default for TableEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bump_wakes_subscriber() {
        let events = TableEvents::new();
        let mut rx = events.subscribe(Table::News);

        events.bump(Table::News);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
    }

    #[tokio::test]
    async fn tables_are_independent() {
        let events = TableEvents::new();
        let rx_alerts = events.subscribe(Table::Alerts);

        events.bump(Table::News);

        assert_eq!(*rx_alerts.borrow(), 0);
    }
}
