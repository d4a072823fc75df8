//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};
use sqlx::PgPool;

use crate::config::ConsoleConfig;
use crate::services::{ChangeFeed, Snapshots};

/// Application state shared across all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ConsoleConfig,
    pool: PgPool,
    snapshots: Snapshots,
    changes: ChangeFeed,
}

impl AppState {
    /// Build the state. Does not start the change listener; see
    /// [`ChangeFeed::spawn_listener`].
    #[must_use]
    pub fn new(config: ConsoleConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                snapshots: Snapshots::new(),
                changes: ChangeFeed::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn snapshots(&self) -> &Snapshots {
        &self.inner.snapshots
    }

    #[must_use]
    pub fn changes(&self) -> &ChangeFeed {
        &self.inner.changes
    }

    /// The business timezone.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.inner.config.utc_offset
    }

    /// Today's date in the business timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset()).date_naive()
    }
}
