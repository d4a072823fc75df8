//! Style CS prompt repository (`"AIPrompt"`).
//!
//! The bot reads the most recent row; the console edits that same row.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use cs_console_core::PromptId;

use super::RepositoryError;

/// The speaking style and extra context handed to the bot.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StylePrompt {
    pub id: PromptId,
    pub gaya_bahasa: Option<String>,
    pub informasi_tambahan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for the Style CS prompt.
pub struct StylePromptRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StylePromptRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The most recently created prompt, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self) -> Result<Option<StylePrompt>, RepositoryError> {
        let row = sqlx::query_as::<_, StylePrompt>(
            r#"
            SELECT id, gaya_bahasa, informasi_tambahan, created_at, updated_at
            FROM "AIPrompt"
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Update `existing`, or insert the first prompt when there is none.
    ///
    /// Returns the saved row and whether it was newly created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if `existing` was deleted meanwhile.
    pub async fn save(
        &self,
        existing: Option<PromptId>,
        gaya_bahasa: Option<&str>,
        informasi_tambahan: Option<&str>,
    ) -> Result<(StylePrompt, bool), RepositoryError> {
        if let Some(id) = existing {
            let row = sqlx::query_as::<_, StylePrompt>(
                r#"
                UPDATE "AIPrompt"
                SET gaya_bahasa = $2, informasi_tambahan = $3, updated_at = now()
                WHERE id = $1
                RETURNING id, gaya_bahasa, informasi_tambahan, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(gaya_bahasa)
            .bind(informasi_tambahan)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
            return Ok((row, false));
        }

        let row = sqlx::query_as::<_, StylePrompt>(
            r#"
            INSERT INTO "AIPrompt" (gaya_bahasa, informasi_tambahan)
            VALUES ($1, $2)
            RETURNING id, gaya_bahasa, informasi_tambahan, created_at, updated_at
            "#,
        )
        .bind(gaya_bahasa)
        .bind(informasi_tambahan)
        .fetch_one(self.pool)
        .await?;

        Ok((row, true))
    }
}
