//! Orders with their cart summaries ("Kelola Pembelian").

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cs_console_core::OrderStatus;

use crate::db::{OrderRepository, OrderSummary};
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::models::Flash;
use crate::services::{CsvDownload, Screen};
use crate::state::AppState;

use super::redirect_with;
use super::shell::{PageShell, local_time};

const LOAD_FAILED: &str = "Gagal memuat data pembelian";

/// Shown for an order without a status.
const NO_STATUS: &str = "-";

/// An order card.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub nama_penerima: String,
    pub alamat_penerima: String,
    pub no_hp_penerima: String,
    pub status_label: String,
    pub status_badge: &'static str,
    /// Stored status text, for preselecting the status select.
    pub status_value: String,
    pub ringkasan: String,
    pub total: String,
    pub updated_at: String,
}

/// A status choice in an order's status select.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: String,
    pub label: String,
}

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub shell: PageShell,
    pub orders: Vec<OrderView>,
    pub summary: OrderSummary,
    pub statuses: Vec<StatusOption>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/export.csv", get(export))
        .route("/orders/{id}/status", post(set_status))
}

fn status_options() -> Vec<StatusOption> {
    OrderStatus::SETTABLE
        .iter()
        .map(|s| StatusOption {
            value: s.as_db().to_string(),
            label: s.label().to_string(),
        })
        .collect()
}

/// Orders page.
#[instrument(skip(staff, state, session))]
async fn index(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
) -> OrdersTemplate {
    let loaded = state
        .snapshots()
        .load(Screen::Orders, OrderRepository::new(state.pool()).list_with_carts())
        .await;

    let offset = state.offset();
    let shell = PageShell::new(&staff, "/orders", &session)
        .await
        .watching(&["Order", "Cart"])
        .with_load_error(loaded.failed, LOAD_FAILED);

    OrdersTemplate {
        shell,
        summary: OrderSummary::from_orders(&loaded.rows),
        statuses: status_options(),
        orders: loaded
            .rows
            .iter()
            .map(|o| OrderView {
                id: o.id.clone(),
                nama_penerima: o.nama_penerima.clone().unwrap_or_else(|| "Belum diisi".to_string()),
                alamat_penerima: o
                    .alamat_penerima
                    .clone()
                    .unwrap_or_else(|| "Alamat belum diisi".to_string()),
                no_hp_penerima: o.no_hp_penerima.clone().unwrap_or_default(),
                status_label: o.status.as_ref().map_or(NO_STATUS, OrderStatus::label).to_string(),
                status_badge: o.status.as_ref().map_or("badge-gray", OrderStatus::badge_class),
                status_value: o.status.as_ref().map(OrderStatus::as_db).unwrap_or_default().to_string(),
                ringkasan: o.ringkasan.clone(),
                total: o.total_pembayaran.to_string(),
                updated_at: local_time(o.updated_at, offset),
            })
            .collect(),
    }
}

/// Set an order's status.
#[instrument(skip(_staff, state, session, form))]
async fn set_status(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let status = OrderStatus::from_db(form.status.trim());
    if !status.is_settable() {
        return redirect_with(&session, Flash::error("Status pesanan tidak valid"), "/orders").await;
    }

    let flash = match OrderRepository::new(state.pool()).update_status(&id, &status).await {
        Ok(()) => {
            tracing::info!(status = %status, "Order status updated");
            Flash::success(format!("Status pesanan diubah menjadi {}", status.label()))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update order status");
            Flash::error("Gagal memperbarui status pesanan")
        }
    };
    redirect_with(&session, flash, "/orders").await
}

/// Download orders as CSV.
#[instrument(skip(_staff, state))]
async fn export(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
) -> Result<CsvDownload, AppError> {
    let orders = OrderRepository::new(state.pool()).list_with_carts().await?;
    Ok(CsvDownload::build("orders", state.today(), &orders)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_options_round_trip_through_db_values() {
        for option in status_options() {
            let status = OrderStatus::from_db(&option.value);
            assert!(status.is_settable());
            assert_eq!(status.label(), option.label);
        }
    }
}
