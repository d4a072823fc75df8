//! Table change feed.
//!
//! Triggers on the managed tables `pg_notify('table_changes', TG_TABLE_NAME)`.
//! One background task listens on that channel and fans the table names out
//! through a broadcast channel; each open page subscribes through
//! `/api/events` and re-fetches when its tables change.
//!
//! Bursts are coalesced per subscriber: the first matching change opens a
//! short window, every change arriving inside it is absorbed, and a single
//! refresh is emitted when the window closes.

use std::time::Duration;

use futures::Stream;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;

/// `NOTIFY` channel the triggers publish on.
pub const CHANNEL: &str = "table_changes";

/// Window within which bursts collapse into one refresh.
pub const COALESCE_WINDOW: Duration = Duration::from_millis(500);

/// Delay before listening again after the connection drops.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Broadcast buffer size; slower subscribers lag and just refresh.
const FEED_CAPACITY: usize = 256;

/// A change to one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableChange {
    pub table: String,
}

/// Which tables a subscriber cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter(Vec<String>);

impl TableFilter {
    /// Parse a comma-separated list; empty means every table.
    #[must_use]
    pub fn parse(list: Option<&str>) -> Self {
        Self(
            list.unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    #[must_use]
    pub fn matches(&self, table: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|t| t == table)
    }
}

/// Fan-out point for table changes. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<TableChange>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.sender.subscribe()
    }

    /// Publish a change; returns how many subscribers received it.
    pub fn publish(&self, table: impl Into<String>) -> usize {
        self.sender
            .send(TableChange {
                table: table.into(),
            })
            .unwrap_or(0)
    }

    /// Spawn the `LISTEN` task feeding this channel.
    ///
    /// The task reconnects on its own and runs for the life of the process.
    #[must_use]
    pub fn spawn_listener(&self, pool: PgPool) -> JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = feed.listen(&pool).await {
                    tracing::warn!(error = %e, "Change listener stopped, retrying");
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        })
    }

    async fn listen(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(CHANNEL).await?;
        tracing::info!(channel = CHANNEL, "Listening for table changes");

        loop {
            let notification = listener.recv().await?;
            let table = notification.payload();
            tracing::debug!(table, "Table changed");
            self.publish(table);
        }
    }
}

/// Turn a subscription into a stream of coalesced refresh events.
///
/// Ends when the feed is dropped.
pub fn coalesced(
    mut rx: broadcast::Receiver<TableChange>,
    filter: TableFilter,
    window: Duration,
) -> impl Stream<Item = TableChange> {
    async_stream::stream! {
        loop {
            let first = match rx.recv().await {
                Ok(change) if filter.matches(&change.table) => change,
                Ok(_) => continue,
                // Missed events; assume something relevant changed
                Err(RecvError::Lagged(_)) => TableChange { table: "*".to_string() },
                Err(RecvError::Closed) => break,
            };

            tokio::time::sleep(window).await;
            let closed = loop {
                match rx.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                    Err(TryRecvError::Empty) => break false,
                    Err(TryRecvError::Closed) => break true,
                }
            };

            yield first;
            if closed {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse() {
        let filter = TableFilter::parse(Some("Order, Cart,,"));
        assert!(filter.matches("Order"));
        assert!(filter.matches("Cart"));
        assert!(!filter.matches("Produk"));

        let all = TableFilter::parse(None);
        assert!(all.matches("Keluhan"));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let feed = ChangeFeed::new();
        assert_eq!(feed.publish("Produk"), 0);
        let _rx = feed.subscribe();
        assert_eq!(feed.publish("Produk"), 1);
    }
}
