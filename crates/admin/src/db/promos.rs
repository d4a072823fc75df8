//! Promotion repository (`"Promo"`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;

/// A promotion, with the name of its linked product when there is one.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Promo {
    pub id: String,
    pub nama: String,
    pub judul_promo: Option<String>,
    pub jenis: Option<String>,
    pub deskripsi: Option<String>,
    pub product_id: Option<String>,
    pub product_nama: Option<String>,
    pub syarat_ketentuan: Option<String>,
    pub tanggal_mulai: Option<NaiveDate>,
    pub tanggal_selesai: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Promo {
    /// Whether the promo runs on `day` (both bounds inclusive).
    ///
    /// A missing bound is open-ended.
    #[must_use]
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.tanggal_mulai.is_none_or(|start| start <= day)
            && self.tanggal_selesai.is_none_or(|end| day <= end)
    }
}

/// Validated fields for creating or updating a promo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoInput {
    pub nama: String,
    pub judul_promo: String,
    pub jenis: Option<String>,
    pub deskripsi: Option<String>,
    pub product_id: Option<String>,
    pub syarat_ketentuan: Option<String>,
    pub tanggal_mulai: NaiveDate,
    pub tanggal_selesai: NaiveDate,
}

const PROMO_SELECT: &str = r#"
    SELECT p.id, p.nama, p.judul_promo, p.jenis, p.deskripsi, p.product_id,
           pr.nama AS product_nama, p.syarat_ketentuan, p.tanggal_mulai,
           p.tanggal_selesai, p.created_at, p.updated_at
    FROM "Promo" p
    LEFT JOIN "Produk" pr ON pr.id = p.product_id
"#;

/// Repository for promo database operations.
pub struct PromoRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromoRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all promos, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Promo>, RepositoryError> {
        let sql = format!("{PROMO_SELECT} ORDER BY p.created_at DESC");
        let rows = sqlx::query_as::<_, Promo>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a promo by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &str) -> Result<Option<Promo>, RepositoryError> {
        let sql = format!("{PROMO_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, Promo>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Create a promo and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including an
    /// unknown linked product).
    pub async fn create(&self, input: &PromoInput) -> Result<String, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO "Promo" (id, nama, judul_promo, jenis, deskripsi, product_id,
                                 syarat_ketentuan, tanggal_mulai, tanggal_selesai)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&id)
        .bind(&input.nama)
        .bind(&input.judul_promo)
        .bind(&input.jenis)
        .bind(&input.deskripsi)
        .bind(&input.product_id)
        .bind(&input.syarat_ketentuan)
        .bind(input.tanggal_mulai)
        .bind(input.tanggal_selesai)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "promo"))?;

        Ok(id)
    }

    /// Update a promo.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no promo has that id.
    pub async fn update(&self, id: &str, input: &PromoInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE "Promo"
            SET nama = $2, judul_promo = $3, jenis = $4, deskripsi = $5, product_id = $6,
                syarat_ketentuan = $7, tanggal_mulai = $8, tanggal_selesai = $9,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.nama)
        .bind(&input.judul_promo)
        .bind(&input.jenis)
        .bind(&input.deskripsi)
        .bind(&input.product_id)
        .bind(&input.syarat_ketentuan)
        .bind(input.tanggal_mulai)
        .bind(input.tanggal_selesai)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a promo.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no promo has that id.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM "Promo" WHERE id = $1"#)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
