//! Product catalog repository (`"Produk"`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;

/// A catalog product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: String,
    pub product_id: Option<i32>,
    pub nama: String,
    pub deskripsi: Option<String>,
    pub kategori: Option<String>,
    pub harga: Option<Decimal>,
    pub stok: Option<i32>,
    pub berat: Option<f64>,
    pub ukuran: Option<String>,
    pub warna: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for creating or updating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub nama: String,
    pub deskripsi: Option<String>,
    pub kategori: Option<String>,
    pub harga: Option<Decimal>,
    pub stok: Option<i32>,
    pub berat: Option<f64>,
    pub ukuran: Option<String>,
    pub warna: Option<String>,
}

const PRODUCT_COLUMNS: &str = "id, product_id, nama, deskripsi, kategori, harga, stok, berat, \
                               ukuran, warna, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(r#"SELECT {PRODUCT_COLUMNS} FROM "Produk" ORDER BY created_at DESC"#);
        let rows = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a product by its text id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &str) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(r#"SELECT {PRODUCT_COLUMNS} FROM "Produk" WHERE id = $1"#);
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Create a product with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO "Produk" (id, nama, deskripsi, kategori, harga, stok, berat, ukuran, warna)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&input.nama)
            .bind(&input.deskripsi)
            .bind(&input.kategori)
            .bind(input.harga)
            .bind(input.stok)
            .bind(input.berat)
            .bind(&input.ukuran)
            .bind(&input.warna)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_insert(e, "product"))?;
        Ok(row)
    }

    /// Update every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has that id.
    pub async fn update(&self, id: &str, input: &ProductInput) -> Result<Product, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE "Produk"
            SET nama = $2, deskripsi = $3, kategori = $4, harga = $5, stok = $6,
                berat = $7, ukuran = $8, warna = $9, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&input.nama)
            .bind(&input.deskripsi)
            .bind(&input.kategori)
            .bind(input.harga)
            .bind(input.stok)
            .bind(input.berat)
            .bind(&input.ukuran)
            .bind(&input.warna)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has that id.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        // Promos pointing at it are unlinked by the foreign key
        let result = sqlx::query(r#"DELETE FROM "Produk" WHERE id = $1"#)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
