//! Customer journey repository (`"CustomerJourney"`).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use cs_console_core::{JourneyId, JourneyStage};

use super::RepositoryError;

/// One funnel event for a customer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Journey {
    pub id: JourneyId,
    pub phone_number: Option<String>,
    pub customer_journey: String,
    pub follow_up: bool,
    pub message: Option<String>,
    pub message_id: Option<String>,
    pub session: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Journey {
    /// The parsed stage, if the stored value is one the console knows.
    #[must_use]
    pub fn stage(&self) -> Option<JourneyStage> {
        self.customer_journey.parse().ok()
    }

    /// Case-insensitive match of `needle` against phone, stage and message.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |field: &str| field.to_lowercase().contains(&needle);
        self.phone_number.as_deref().is_some_and(hit)
            || hit(&self.customer_journey)
            || self.message.as_deref().is_some_and(hit)
    }
}

/// Validated fields for creating or updating a journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyInput {
    pub phone_number: Option<String>,
    pub stage: JourneyStage,
    pub follow_up: bool,
    pub message: Option<String>,
    pub message_id: Option<String>,
    pub session: Option<String>,
}

/// Counts shown above the journey list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JourneyMetrics {
    pub total: usize,
    pub need_follow_up: usize,
    pub unique_customers: usize,
}

impl JourneyMetrics {
    #[must_use]
    pub fn from_journeys(journeys: &[Journey]) -> Self {
        let unique: HashSet<&str> = journeys
            .iter()
            .filter_map(|j| j.phone_number.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            total: journeys.len(),
            need_follow_up: journeys.iter().filter(|j| j.follow_up).count(),
            unique_customers: unique.len(),
        }
    }
}

const JOURNEY_COLUMNS: &str = "id, phone_number, customer_journey, follow_up, message, \
                               message_id, session, created_at, updated_at";

/// Repository for customer journey database operations.
pub struct JourneyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> JourneyRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every journey row, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Journey>, RepositoryError> {
        let sql = format!(
            r#"SELECT {JOURNEY_COLUMNS} FROM "CustomerJourney" ORDER BY created_at DESC"#
        );
        let rows = sqlx::query_as::<_, Journey>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a journey by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: JourneyId) -> Result<Option<Journey>, RepositoryError> {
        let sql = format!(r#"SELECT {JOURNEY_COLUMNS} FROM "CustomerJourney" WHERE id = $1"#);
        let row = sqlx::query_as::<_, Journey>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Create a journey row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &JourneyInput) -> Result<Journey, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO "CustomerJourney"
                (phone_number, customer_journey, follow_up, message, message_id, session)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {JOURNEY_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Journey>(&sql)
            .bind(&input.phone_number)
            .bind(input.stage.as_db())
            .bind(input.follow_up)
            .bind(&input.message)
            .bind(&input.message_id)
            .bind(&input.session)
            .fetch_one(self.pool)
            .await?;
        Ok(row)
    }

    /// Update a journey row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no journey has that id.
    pub async fn update(&self, id: JourneyId, input: &JourneyInput) -> Result<Journey, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE "CustomerJourney"
            SET phone_number = $2, customer_journey = $3, follow_up = $4, message = $5,
                message_id = $6, session = $7, updated_at = now()
            WHERE id = $1
            RETURNING {JOURNEY_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Journey>(&sql)
            .bind(id)
            .bind(&input.phone_number)
            .bind(input.stage.as_db())
            .bind(input.follow_up)
            .bind(&input.message)
            .bind(&input.message_id)
            .bind(&input.session)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Flip the follow-up flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no journey has that id.
    pub async fn toggle_follow_up(&self, id: JourneyId) -> Result<Journey, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE "CustomerJourney"
            SET follow_up = NOT follow_up, updated_at = now()
            WHERE id = $1
            RETURNING {JOURNEY_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Journey>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a journey row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no journey has that id.
    pub async fn delete(&self, id: JourneyId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM "CustomerJourney" WHERE id = $1"#)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey(id: i64, phone: Option<&str>, stage: &str, follow_up: bool, msg: Option<&str>) -> Journey {
        Journey {
            id: JourneyId::new(id),
            phone_number: phone.map(str::to_string),
            customer_journey: stage.to_string(),
            follow_up,
            message: msg.map(str::to_string),
            message_id: None,
            session: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_metrics_counts_distinct_non_empty_phones() {
        let journeys = vec![
            journey(1, Some("628111"), "pelanggan_tanya", false, None),
            journey(2, Some("628111"), "pelanggan_beli", true, None),
            journey(3, Some(""), "pelanggan_tanya", false, None),
            journey(4, None, "pelanggan_nego", true, None),
            journey(5, Some("628222"), "pelanggan_komplain", false, None),
        ];
        assert_eq!(
            JourneyMetrics::from_journeys(&journeys),
            JourneyMetrics {
                total: 5,
                need_follow_up: 2,
                unique_customers: 2
            }
        );
    }

    #[test]
    fn test_search_is_case_insensitive_over_fields() {
        let j = journey(1, Some("6281234"), "pelanggan_nego", false, Some("Minta DISKON dong"));
        assert!(j.matches_search("diskon"));
        assert!(j.matches_search("NEGO"));
        assert!(j.matches_search("81234"));
        assert!(j.matches_search("  "));
        assert!(!j.matches_search("ongkir"));
    }

    #[test]
    fn test_unknown_stage_is_kept_but_unparsed() {
        let j = journey(1, None, "pelanggan_hilang", false, None);
        assert_eq!(j.stage(), None);
        assert_eq!(j.customer_journey, "pelanggan_hilang");
    }
}
