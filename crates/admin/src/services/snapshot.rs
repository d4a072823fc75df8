//! Last-good list snapshots.
//!
//! Every list screen stores the rows of its last successful fetch here. When
//! a later fetch fails the screen renders the stored rows with an error toast
//! instead of an empty table.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::db::{
    Complaint, ComplaintFilter, Hold, Journey, OrderWithCart, Product, Promo, StylePrompt,
};

/// Snapshot lifetime; a console left open overnight starts fresh.
const SNAPSHOT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Which screen a snapshot belongs to.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Screen {
    Holds,
    Products,
    Promos,
    Orders,
    Complaints(ComplaintFilter),
    Journeys,
    StyleCs,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum SnapshotValue {
    Holds(Arc<Vec<Hold>>),
    Products(Arc<Vec<Product>>),
    Promos(Arc<Vec<Promo>>),
    Orders(Arc<Vec<OrderWithCart>>),
    Complaints(Arc<Vec<Complaint>>),
    Journeys(Arc<Vec<Journey>>),
    StyleCs(Arc<Vec<StylePrompt>>),
}

/// Row types that can be kept as a snapshot.
pub trait SnapshotRows: Clone + Send + Sync + 'static {
    fn wrap(rows: Arc<Vec<Self>>) -> SnapshotValue;
    fn unwrap(value: SnapshotValue) -> Option<Arc<Vec<Self>>>;
}

macro_rules! snapshot_rows {
    ($ty:ty, $variant:ident) => {
        impl SnapshotRows for $ty {
            fn wrap(rows: Arc<Vec<Self>>) -> SnapshotValue {
                SnapshotValue::$variant(rows)
            }

            fn unwrap(value: SnapshotValue) -> Option<Arc<Vec<Self>>> {
                match value {
                    SnapshotValue::$variant(rows) => Some(rows),
                    _ => None,
                }
            }
        }
    };
}

snapshot_rows!(Hold, Holds);
snapshot_rows!(Product, Products);
snapshot_rows!(Promo, Promos);
snapshot_rows!(OrderWithCart, Orders);
snapshot_rows!(Complaint, Complaints);
snapshot_rows!(Journey, Journeys);
snapshot_rows!(StylePrompt, StyleCs);

/// Outcome of a list fetch.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub rows: Vec<T>,
    /// The fetch failed; `rows` are the last good rows (possibly none).
    pub failed: bool,
}

/// In-process store of last-good list fetches. Cheap to clone.
#[derive(Clone)]
pub struct Snapshots {
    cache: Cache<Screen, SnapshotValue>,
}

impl Default for Snapshots {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshots {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(SNAPSHOT_TTL)
            .build();
        Self { cache }
    }

    /// Store the rows of a successful fetch.
    pub async fn remember<T: SnapshotRows>(&self, screen: Screen, rows: &[T]) {
        self.cache
            .insert(screen, T::wrap(Arc::new(rows.to_vec())))
            .await;
    }

    /// The last good rows for `screen`.
    pub async fn last<T: SnapshotRows>(&self, screen: Screen) -> Option<Vec<T>> {
        let value = self.cache.get(&screen).await?;
        T::unwrap(value).map(|rows| rows.as_ref().clone())
    }

    /// Run a list fetch, remembering its rows or falling back to the last
    /// good ones on error.
    pub async fn load<T, E, F>(&self, screen: Screen, fetch: F) -> Loaded<T>
    where
        T: SnapshotRows,
        E: std::fmt::Display,
        F: Future<Output = Result<Vec<T>, E>>,
    {
        match fetch.await {
            Ok(rows) => {
                self.remember(screen, &rows).await;
                Loaded {
                    rows,
                    failed: false,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, ?screen, "List fetch failed, showing last snapshot");
                Loaded {
                    rows: self.last(screen).await.unwrap_or_default(),
                    failed: true,
                }
            }
        }
    }
}
