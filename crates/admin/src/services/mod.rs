//! Business logic services for the console.
//!
//! # Services
//!
//! - `auth` - Username/password sign-in with Argon2 hashes
//! - `changes` - `LISTEN table_changes` fan-out with burst coalescing
//! - `export` - CSV downloads for the list screens
//! - `metrics` - Dashboard aggregation and the daily metrics job
//! - `snapshot` - Last-good rows per list screen
//! - `token_usage` - Per-day token usage report and demo data

pub mod auth;
pub mod changes;
pub mod export;
pub mod metrics;
pub mod snapshot;
pub mod token_usage;

pub use auth::{AuthError, AuthService};
pub use changes::{COALESCE_WINDOW, ChangeFeed, TableChange, TableFilter, coalesced};
pub use export::{CsvDownload, CsvRecord, ExportError, to_csv};
pub use metrics::{DashboardMetrics, MetricTotals, MetricsError, MetricsService, fold_buckets};
pub use snapshot::{Loaded, Screen, Snapshots};
pub use token_usage::{TokenUsageReport, build_report, demo_report, format_compact};
