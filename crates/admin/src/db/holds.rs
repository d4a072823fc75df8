//! Bot hold list repository.
//!
//! A customer whose row has `is_hold = true` is handled by a human; the bot
//! stays silent for that phone number.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use cs_console_core::PhoneNumber;

use super::RepositoryError;

/// A row of the hold list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Hold {
    pub phone_number: String,
    pub is_hold: bool,
    pub customer_journey: Option<String>,
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counts shown above the hold table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldSummary {
    pub total: usize,
    pub on_hold: usize,
    pub active: usize,
}

impl HoldSummary {
    #[must_use]
    pub fn from_holds(holds: &[Hold]) -> Self {
        let on_hold = holds.iter().filter(|h| h.is_hold).count();
        Self {
            total: holds.len(),
            on_hold,
            active: holds.len() - on_hold,
        }
    }
}

/// Repository for the `"User"` hold table.
pub struct HoldRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HoldRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every hold record, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Hold>, RepositoryError> {
        let rows = sqlx::query_as::<_, Hold>(
            r#"
            SELECT phone_number, is_hold, customer_journey, last_message,
                   created_at, updated_at
            FROM "User"
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Put a phone number on hold, creating its row if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn hold(&self, phone: &PhoneNumber) -> Result<Hold, RepositoryError> {
        let row = sqlx::query_as::<_, Hold>(
            r#"
            INSERT INTO "User" (phone_number, is_hold, updated_at)
            VALUES ($1, true, now())
            ON CONFLICT (phone_number)
            DO UPDATE SET is_hold = true, updated_at = now()
            RETURNING phone_number, is_hold, customer_journey, last_message,
                      created_at, updated_at
            "#,
        )
        .bind(phone)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Flip `is_hold` for one phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the number is not in the list.
    pub async fn toggle(&self, phone_number: &str) -> Result<Hold, RepositoryError> {
        sqlx::query_as::<_, Hold>(
            r#"
            UPDATE "User"
            SET is_hold = NOT is_hold, updated_at = now()
            WHERE phone_number = $1
            RETURNING phone_number, is_hold, customer_journey, last_message,
                      created_at, updated_at
            "#,
        )
        .bind(phone_number)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hold(phone: &str, is_hold: bool) -> Hold {
        Hold {
            phone_number: phone.to_string(),
            is_hold,
            customer_journey: None,
            last_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let holds = vec![
            hold("6281100000001", true),
            hold("6281100000002", false),
            hold("6281100000003", true),
        ];
        let summary = HoldSummary::from_holds(&holds);
        assert_eq!(
            summary,
            HoldSummary {
                total: 3,
                on_hold: 2,
                active: 1
            }
        );
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(HoldSummary::from_holds(&[]), HoldSummary::default());
    }
}
