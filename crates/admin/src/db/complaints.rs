//! Complaint repository (`"Keluhan"`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;

/// A customer complaint raised through the bot.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Complaint {
    pub id: Uuid,
    #[sqlx(rename = "Nomor_Pelanggan")]
    pub nomor_pelanggan: Option<i64>,
    #[sqlx(rename = "Nama_Pelanggan")]
    pub nama_pelanggan: Option<String>,
    #[sqlx(rename = "Keluhan")]
    pub keluhan: Option<String>,
    pub sudah_ditangani: bool,
    #[sqlx(rename = "Datetime")]
    pub datetime: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Which complaints to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintFilter {
    #[default]
    All,
    Unhandled,
    Handled,
}

impl ComplaintFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Unhandled, Self::Handled];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unhandled => "unhandled",
            Self::Handled => "handled",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Semua",
            Self::Unhandled => "Belum ditangani",
            Self::Handled => "Sudah ditangani",
        }
    }

    /// Parse a `?filter=` value; anything unknown shows every complaint.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        value
            .map(str::trim)
            .and_then(|v| Self::ALL.into_iter().find(|f| f.as_str() == v))
            .unwrap_or_default()
    }

    /// The `sudah_ditangani` value to match, or `None` for every row.
    #[must_use]
    pub const fn handled(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Unhandled => Some(false),
            Self::Handled => Some(true),
        }
    }
}

const COMPLAINT_COLUMNS: &str = r#"id, "Nomor_Pelanggan", "Nama_Pelanggan", "Keluhan",
                                   sudah_ditangani, "Datetime", updated_at"#;

/// Repository for complaint database operations.
pub struct ComplaintRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ComplaintRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List complaints matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {COMPLAINT_COLUMNS}
            FROM "Keluhan"
            WHERE ($1::bool IS NULL OR sudah_ditangani = $1)
            ORDER BY "Datetime" DESC
            "#
        );
        let rows = sqlx::query_as::<_, Complaint>(&sql)
            .bind(filter.handled())
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Flip `sudah_ditangani` for one complaint.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no complaint has that id.
    pub async fn toggle_handled(&self, id: Uuid) -> Result<Complaint, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE "Keluhan"
            SET sudah_ditangani = NOT sudah_ditangani, updated_at = now()
            WHERE id = $1
            RETURNING {COMPLAINT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Complaint>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_handled_values() {
        assert_eq!(ComplaintFilter::All.handled(), None);
        assert_eq!(ComplaintFilter::Unhandled.handled(), Some(false));
        assert_eq!(ComplaintFilter::Handled.handled(), Some(true));
    }

    #[test]
    fn test_filter_deserializes_from_query_value() {
        let filter: ComplaintFilter = serde_json::from_str("\"unhandled\"").unwrap_or_default();
        assert_eq!(filter, ComplaintFilter::Unhandled);
    }

    #[test]
    fn test_filter_parse_falls_back_to_all() {
        assert_eq!(ComplaintFilter::parse(Some("handled")), ComplaintFilter::Handled);
        assert_eq!(ComplaintFilter::parse(Some(" unhandled ")), ComplaintFilter::Unhandled);
        assert_eq!(ComplaintFilter::parse(Some("bogus")), ComplaintFilter::All);
        assert_eq!(ComplaintFilter::parse(Some("")), ComplaintFilter::All);
        assert_eq!(ComplaintFilter::parse(None), ComplaintFilter::All);
    }
}
