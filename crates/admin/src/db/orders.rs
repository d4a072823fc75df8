//! Order repository (`"Order"` joined with `"Cart"`).
//!
//! An order and its cart share the same text id. The list is fetched with a
//! single `LEFT JOIN` so an order without a cart still shows up.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use cs_console_core::{OrderStatus, Rupiah};

use super::RepositoryError;

/// Placeholder shown when an order has no cart summary.
pub const NO_SUMMARY: &str = "Tidak ada ringkasan";

/// An order with the summary and total of its cart.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithCart {
    pub id: String,
    pub nama_penerima: Option<String>,
    pub alamat_penerima: Option<String>,
    pub no_hp_penerima: Option<String>,
    /// `None` when the bot has not set a status yet.
    pub status: Option<OrderStatus>,
    pub ringkasan: String,
    pub total_pembayaran: Rupiah,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderCartRow {
    id: String,
    nama_penerima: Option<String>,
    alamat_penerima: Option<String>,
    no_hp_penerima: Option<String>,
    status: Option<String>,
    ringkasan: Option<String>,
    total_pembayaran: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderCartRow> for OrderWithCart {
    fn from(row: OrderCartRow) -> Self {
        Self {
            id: row.id,
            nama_penerima: row.nama_penerima,
            alamat_penerima: row.alamat_penerima,
            no_hp_penerima: row.no_hp_penerima,
            status: row
                .status
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(OrderStatus::from_db),
            ringkasan: row
                .ringkasan
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| NO_SUMMARY.to_string()),
            total_pembayaran: Rupiah::new(row.total_pembayaran.unwrap_or(Decimal::ZERO)),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Counts shown above the order list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderSummary {
    pub total: usize,
    pub processing: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl OrderSummary {
    #[must_use]
    pub fn from_orders(orders: &[OrderWithCart]) -> Self {
        let count = |status: &OrderStatus| {
            orders
                .iter()
                .filter(|o| o.status.as_ref() == Some(status))
                .count()
        };
        Self {
            total: orders.len(),
            processing: count(&OrderStatus::Processing),
            completed: count(&OrderStatus::Completed),
            cancelled: count(&OrderStatus::Cancelled),
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders with their cart summary, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_carts(&self) -> Result<Vec<OrderWithCart>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderCartRow>(
            r#"
            SELECT o.id, o.nama_penerima, o.alamat_penerima, o.no_hp_penerima, o.status,
                   c.ringkasan, c.total_pembayaran, o.created_at, o.updated_at
            FROM "Order" o
            LEFT JOIN "Cart" c ON c.id = o.id
            ORDER BY o.updated_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has that id.
    pub async fn update_status(&self, id: &str, status: &OrderStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE "Order"
            SET status = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_db())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
