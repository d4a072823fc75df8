//! Customer complaints (`"Keluhan"`).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::db::{Complaint, ComplaintFilter, ComplaintRepository};
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::models::Flash;
use crate::services::{CsvDownload, Screen};
use crate::state::AppState;

use super::redirect_with;
use super::shell::{PageShell, local_time};

const LOAD_FAILED: &str = "Gagal memuat data keluhan";

/// A complaint card.
#[derive(Debug, Clone)]
pub struct ComplaintView {
    pub id: Uuid,
    pub nomor_pelanggan: String,
    pub nama_pelanggan: String,
    pub keluhan: String,
    pub sudah_ditangani: bool,
    pub datetime: String,
}

/// A tab of the filter bar.
#[derive(Debug, Clone)]
pub struct FilterTab {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Complaints page template.
#[derive(Template, WebTemplate)]
#[template(path = "complaints/index.html")]
pub struct ComplaintsTemplate {
    pub shell: PageShell,
    pub complaints: Vec<ComplaintView>,
    pub tabs: Vec<FilterTab>,
    pub filter: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ComplaintQuery {
    pub filter: Option<String>,
}

impl ComplaintQuery {
    fn filter(&self) -> ComplaintFilter {
        ComplaintFilter::parse(self.filter.as_deref())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/complaints", get(index))
        .route("/complaints/export.csv", get(export))
        .route("/complaints/{id}/toggle", post(toggle))
}

fn complaints_path(filter: ComplaintFilter) -> String {
    match filter {
        ComplaintFilter::All => "/complaints".to_string(),
        other => format!("/complaints?filter={}", other.as_str()),
    }
}

/// Complaints page.
#[instrument(skip(staff, state, session))]
async fn index(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ComplaintQuery>,
) -> ComplaintsTemplate {
    let filter = query.filter();
    let loaded = state
        .snapshots()
        .load(
            Screen::Complaints(filter),
            ComplaintRepository::new(state.pool()).list(filter),
        )
        .await;

    let offset = state.offset();
    let shell = PageShell::new(&staff, "/complaints", &session)
        .await
        .watching(&["Keluhan"])
        .with_load_error(loaded.failed, LOAD_FAILED);

    ComplaintsTemplate {
        shell,
        filter: filter.as_str(),
        tabs: ComplaintFilter::ALL
            .into_iter()
            .map(|f| FilterTab {
                value: f.as_str(),
                label: f.label(),
                selected: f == filter,
            })
            .collect(),
        complaints: loaded
            .rows
            .iter()
            .map(|k| ComplaintView {
                id: k.id,
                nomor_pelanggan: k.nomor_pelanggan.map(|n| n.to_string()).unwrap_or_default(),
                nama_pelanggan: k.nama_pelanggan.clone().unwrap_or_default(),
                keluhan: k.keluhan.clone().unwrap_or_default(),
                sudah_ditangani: k.sudah_ditangani,
                datetime: local_time(k.datetime, offset),
            })
            .collect(),
    }
}

fn toggle_message(complaint: &Complaint) -> String {
    let status = if complaint.sudah_ditangani {
        "sudah ditangani"
    } else {
        "belum ditangani"
    };
    format!("Keluhan berhasil ditandai sebagai {status}")
}

/// Flip the handled flag of one complaint, staying on the current filter.
#[instrument(skip(_staff, state, session))]
async fn toggle(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Query(query): Query<ComplaintQuery>,
) -> Redirect {
    let flash = match ComplaintRepository::new(state.pool()).toggle_handled(id).await {
        Ok(complaint) => Flash::success(toggle_message(&complaint)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to toggle complaint");
            Flash::error("Gagal mengupdate status keluhan")
        }
    };
    redirect_with(&session, flash, &complaints_path(query.filter())).await
}

/// Download complaints (current filter) as CSV.
#[instrument(skip(_staff, state))]
async fn export(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<ComplaintQuery>,
) -> Result<CsvDownload, AppError> {
    let complaints = ComplaintRepository::new(state.pool()).list(query.filter()).await?;
    Ok(CsvDownload::build("complaints", state.today(), &complaints)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complaints_path_keeps_filter() {
        assert_eq!(complaints_path(ComplaintFilter::All), "/complaints");
        assert_eq!(
            complaints_path(ComplaintFilter::Unhandled),
            "/complaints?filter=unhandled"
        );
    }

    #[test]
    fn test_unknown_filter_lists_every_complaint() {
        let query = ComplaintQuery {
            filter: Some("bogus".to_string()),
        };
        assert_eq!(query.filter(), ComplaintFilter::All);
        assert_eq!(ComplaintQuery::default().filter(), ComplaintFilter::All);
    }
}
