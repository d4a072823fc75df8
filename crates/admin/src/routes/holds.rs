//! WhatsApp responder hold list (admin only).
//!
//! A number on hold gets no automatic bot replies. Rows are upserted by phone
//! number; toggling flips `is_hold` on exactly one row.

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

use cs_console_core::PhoneNumber;

use crate::db::{Hold, HoldRepository, HoldSummary};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::services::{CsvDownload, Screen};
use crate::state::AppState;

use super::redirect_with;
use super::shell::{PageShell, local_time};

const LOAD_FAILED: &str = "Gagal memuat data pengguna";

/// A hold row for the template.
#[derive(Debug, Clone)]
pub struct HoldView {
    pub phone_number: String,
    pub is_hold: bool,
    pub customer_journey: String,
    pub updated_at: String,
}

/// Holds page template.
#[derive(Template, WebTemplate)]
#[template(path = "holds/index.html")]
pub struct HoldsTemplate {
    pub shell: PageShell,
    pub holds: Vec<HoldView>,
    pub summary: HoldSummary,
}

#[derive(Debug, Deserialize)]
pub struct AddHoldForm {
    #[serde(default)]
    pub phone_number: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/holds", post(add))
        .route("/holds/{phone}/toggle", post(toggle))
        .route("/holds/export.csv", get(export))
}

/// Hold list page.
#[instrument(skip(staff, state, session))]
async fn index(
    RequireAdmin(staff): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> HoldsTemplate {
    let loaded = state
        .snapshots()
        .load(Screen::Holds, HoldRepository::new(state.pool()).list_all())
        .await;

    let offset = state.offset();
    let shell = PageShell::new(&staff, "/", &session)
        .await
        .watching(&["User"])
        .with_load_error(loaded.failed, LOAD_FAILED);

    HoldsTemplate {
        shell,
        summary: HoldSummary::from_holds(&loaded.rows),
        holds: loaded
            .rows
            .iter()
            .map(|h| HoldView {
                phone_number: h.phone_number.clone(),
                is_hold: h.is_hold,
                customer_journey: h.customer_journey.clone().unwrap_or_default(),
                updated_at: local_time(h.updated_at, offset),
            })
            .collect(),
    }
}

/// Put a number on hold, creating its row if needed.
#[instrument(skip(_staff, state, session, form))]
async fn add(
    RequireAdmin(_staff): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddHoldForm>,
) -> Redirect {
    let phone = match PhoneNumber::parse(&form.phone_number) {
        Ok(phone) => phone,
        Err(cs_console_core::PhoneNumberError::Empty) => {
            return redirect_with(&session, Flash::error("Nomor telepon tidak boleh kosong"), "/")
                .await;
        }
        Err(e) => {
            return redirect_with(&session, Flash::error(format!("Nomor telepon tidak valid: {e}")), "/")
                .await;
        }
    };

    let flash = match HoldRepository::new(state.pool()).hold(&phone).await {
        Ok(_) => {
            tracing::info!(phone = %phone, "Number placed on hold");
            Flash::success("Nomor berhasil ditambahkan ke daftar hold")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to add hold");
            Flash::error("Gagal menambahkan nomor ke daftar hold")
        }
    };
    redirect_with(&session, flash, "/").await
}

/// Flip the hold flag of one number.
#[instrument(skip(_staff, state, session))]
async fn toggle(
    RequireAdmin(_staff): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(phone): Path<String>,
) -> Redirect {
    let flash = match HoldRepository::new(state.pool()).toggle(&phone).await {
        Ok(hold) => Flash::success(toggle_message(&hold)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to toggle hold");
            Flash::error("Gagal mengubah status hold")
        }
    };
    redirect_with(&session, flash, "/").await
}

fn toggle_message(hold: &Hold) -> String {
    let state = if hold.is_hold {
        "diaktifkan"
    } else {
        "dinonaktifkan"
    };
    format!("Status hold {state}")
}

/// Download the hold list as CSV.
#[instrument(skip(_staff, state))]
async fn export(
    RequireAdmin(_staff): RequireAdmin,
    State(state): State<AppState>,
) -> Result<CsvDownload, AppError> {
    let holds = HoldRepository::new(state.pool()).list_all().await?;
    Ok(CsvDownload::build("holds", state.today(), &holds)?)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_toggle_message_reflects_new_state() {
        let mut hold = Hold {
            phone_number: "6281234567890".to_string(),
            is_hold: true,
            customer_journey: None,
            last_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(toggle_message(&hold), "Status hold diaktifkan");
        hold.is_hold = false;
        assert_eq!(toggle_message(&hold), "Status hold dinonaktifkan");
    }
}
