//! Staff user repository.
//!
//! All queries are built at runtime with `sqlx::query_as` so the crate builds
//! without a live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use cs_console_core::StaffRole;

use super::RepositoryError;

// =============================================================================
// Domain Types
// =============================================================================

/// A console staff account.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub id: Uuid,
    pub username: String,
    pub role: StaffRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StaffUserRow {
    id: Uuid,
    username: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StaffUserRow> for StaffUser {
    type Error = RepositoryError;

    fn try_from(row: StaffUserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<StaffRole>()
            .map_err(|e| RepositoryError::DataCorruption(format!("user {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            username: row.username,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StaffUserWithHashRow {
    #[sqlx(flatten)]
    user: StaffUserRow,
    password_hash: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for staff user database operations.
pub struct StaffUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StaffUserRepository<'a> {
    /// Create a new staff user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all staff users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored role is invalid.
    pub async fn list_all(&self) -> Result<Vec<StaffUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, StaffUserRow>(
            r"
            SELECT id, username, role, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a staff user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<StaffUser>, RepositoryError> {
        let row = sqlx::query_as::<_, StaffUserRow>(
            r"
            SELECT id, username, role, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a staff user together with their password hash, by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(StaffUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, StaffUserWithHashRow>(
            r"
            SELECT id, username, role, created_at, updated_at, password_hash
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user = StaffUser::try_from(row.user)?;
        Ok(Some((user, row.password_hash)))
    }

    /// Create a staff user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: StaffRole,
    ) -> Result<StaffUser, RepositoryError> {
        let row = sqlx::query_as::<_, StaffUserRow>(
            r"
            INSERT INTO users (id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, role, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(role.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "username"))?;

        row.try_into()
    }

    /// Replace a staff user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that username.
    pub async fn set_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $2, updated_at = now()
            WHERE username = $1
            ",
        )
        .bind(username)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(role: &str) -> StaffUserRow {
        StaffUserRow {
            id: Uuid::nil(),
            username: "sari".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_with_known_role_converts() {
        let user = StaffUser::try_from(row("operator")).unwrap();
        assert_eq!(user.role, StaffRole::Operator);
    }

    #[test]
    fn test_row_with_unknown_role_is_corruption() {
        let result = StaffUser::try_from(row("owner"));
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }
}
