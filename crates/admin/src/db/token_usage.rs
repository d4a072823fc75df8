//! LLM token accounting written by the bot (`"TokenUsage"`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use cs_console_core::TokenUsageId;

use super::RepositoryError;

/// One model call's token counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TokenUsageRecord {
    pub id: TokenUsageId,
    pub timestamp: DateTime<Utc>,
    pub input_token: i64,
    pub output_token: i64,
    pub total: i64,
}

/// Repository for token usage reads.
pub struct TokenUsageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenUsageRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Records stamped in `[start, end)`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TokenUsageRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, TokenUsageRecord>(
            r#"
            SELECT id, "timestamp",
                   COALESCE(input_token, 0)::bigint AS input_token,
                   COALESCE(output_token, 0)::bigint AS output_token,
                   COALESCE(total, COALESCE(input_token, 0) + COALESCE(output_token, 0))::bigint AS total
            FROM "TokenUsage"
            WHERE "timestamp" >= $1 AND "timestamp" < $2
            ORDER BY "timestamp"
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
