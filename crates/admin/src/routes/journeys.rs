//! Customer journeys (`"CustomerJourney"`): search, CRUD and follow-up flag.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cs_console_core::{JourneyId, JourneyStage};

use crate::db::{Journey, JourneyInput, JourneyMetrics, JourneyRepository};
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::models::{CurrentStaff, Flash};
use crate::services::{CsvDownload, Screen};
use crate::state::AppState;

use super::shell::{PageShell, local_time};
use super::{form_text, redirect_with};

const LOAD_FAILED: &str = "Gagal memuat data customer journey";

/// A journey card.
#[derive(Debug, Clone)]
pub struct JourneyView {
    pub id: JourneyId,
    pub phone_number: String,
    pub stage_label: String,
    pub stage_badge: &'static str,
    pub follow_up: bool,
    pub message: String,
    pub message_id: String,
    pub session: String,
    pub created_at: String,
}

/// A stage choice in the journey form.
#[derive(Debug, Clone)]
pub struct StageOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Journeys page template.
#[derive(Template, WebTemplate)]
#[template(path = "journeys/index.html")]
pub struct JourneysTemplate {
    pub shell: PageShell,
    pub journeys: Vec<JourneyView>,
    pub metrics: JourneyMetrics,
    pub q: String,
}

/// Add/edit journey form template.
#[derive(Template, WebTemplate)]
#[template(path = "journeys/form.html")]
pub struct JourneyFormTemplate {
    pub shell: PageShell,
    pub title: &'static str,
    pub action: String,
    pub form: JourneyForm,
    pub stages: Vec<StageOption>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JourneyQuery {
    #[serde(default)]
    pub q: String,
}

/// Raw journey form fields. `follow_up` is a checkbox: present means on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JourneyForm {
    pub phone_number: String,
    pub customer_journey: String,
    pub follow_up: Option<String>,
    pub message: String,
    pub message_id: String,
    pub session: String,
}

impl From<&Journey> for JourneyForm {
    fn from(j: &Journey) -> Self {
        Self {
            phone_number: j.phone_number.clone().unwrap_or_default(),
            customer_journey: j.customer_journey.clone(),
            follow_up: j.follow_up.then(|| "on".to_string()),
            message: j.message.clone().unwrap_or_default(),
            message_id: j.message_id.clone().unwrap_or_default(),
            session: j.session.clone().unwrap_or_default(),
        }
    }
}

impl JourneyForm {
    #[must_use]
    pub const fn follow_up_checked(&self) -> bool {
        self.follow_up.is_some()
    }

    /// Validate the form into a repository input.
    ///
    /// # Errors
    ///
    /// Returns the message to show when the stage is not a known stage.
    pub fn validate(&self) -> Result<JourneyInput, String> {
        let stage = self
            .customer_journey
            .trim()
            .parse::<JourneyStage>()
            .map_err(|_| "Pilih tahap journey yang valid".to_string())?;

        Ok(JourneyInput {
            phone_number: form_text(&self.phone_number),
            stage,
            follow_up: self.follow_up_checked(),
            message: form_text(&self.message),
            message_id: form_text(&self.message_id),
            session: form_text(&self.session),
        })
    }
}

fn stage_options(selected: &str) -> Vec<StageOption> {
    JourneyStage::ALL
        .into_iter()
        .map(|stage| StageOption {
            value: stage.as_db(),
            label: stage.label(),
            selected: stage.as_db() == selected,
        })
        .collect()
}

impl JourneyView {
    fn new(j: &Journey, offset: chrono::FixedOffset) -> Self {
        let stage = j.stage();
        Self {
            id: j.id,
            phone_number: j.phone_number.clone().unwrap_or_else(|| "-".to_string()),
            // Unknown stages are shown verbatim
            stage_label: stage.map_or_else(|| j.customer_journey.clone(), |s| s.label().to_string()),
            stage_badge: stage.map_or("badge-gray", JourneyStage::badge_class),
            follow_up: j.follow_up,
            message: j.message.clone().unwrap_or_default(),
            message_id: j.message_id.clone().unwrap_or_default(),
            session: j.session.clone().unwrap_or_default(),
            created_at: local_time(j.created_at, offset),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/journeys", get(index).post(create))
        .route("/journeys/new", get(new_page))
        .route("/journeys/export.csv", get(export))
        .route("/journeys/{id}", post(update))
        .route("/journeys/{id}/edit", get(edit_page))
        .route("/journeys/{id}/delete", post(delete))
        .route("/journeys/{id}/follow-up", post(toggle_follow_up))
}

/// Journeys page; metrics cover every row, the list only the search hits.
#[instrument(skip(staff, state, session))]
async fn index(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<JourneyQuery>,
) -> JourneysTemplate {
    let loaded = state
        .snapshots()
        .load(Screen::Journeys, JourneyRepository::new(state.pool()).list_all())
        .await;

    let offset = state.offset();
    let shell = PageShell::new(&staff, "/journeys", &session)
        .await
        .watching(&["CustomerJourney"])
        .with_load_error(loaded.failed, LOAD_FAILED);

    JourneysTemplate {
        shell,
        metrics: JourneyMetrics::from_journeys(&loaded.rows),
        journeys: loaded
            .rows
            .iter()
            .filter(|j| j.matches_search(&query.q))
            .map(|j| JourneyView::new(j, offset))
            .collect(),
        q: query.q,
    }
}

fn form_page(
    shell: PageShell,
    title: &'static str,
    action: String,
    form: JourneyForm,
) -> JourneyFormTemplate {
    JourneyFormTemplate {
        stages: stage_options(&form.customer_journey),
        shell,
        title,
        action,
        form,
    }
}

/// Empty add form.
#[instrument(skip(staff, session))]
async fn new_page(RequireStaffAuth(staff): RequireStaffAuth, session: Session) -> JourneyFormTemplate {
    let form = JourneyForm {
        customer_journey: JourneyStage::default().as_db().to_string(),
        ..JourneyForm::default()
    };
    form_page(
        PageShell::new(&staff, "/journeys", &session).await,
        "Tambah Customer Journey",
        "/journeys".to_string(),
        form,
    )
}

/// Edit form prefilled from the stored row.
#[instrument(skip(staff, state, session))]
async fn edit_page(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<JourneyId>,
) -> Result<JourneyFormTemplate, AppError> {
    let journey = JourneyRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("journey {id}")))?;

    Ok(form_page(
        PageShell::new(&staff, "/journeys", &session).await,
        "Edit Customer Journey",
        format!("/journeys/{id}"),
        JourneyForm::from(&journey),
    ))
}

async fn invalid_form(
    staff: &CurrentStaff,
    session: &Session,
    title: &'static str,
    action: String,
    form: JourneyForm,
    message: String,
) -> Response {
    let shell = PageShell::new(staff, "/journeys", session)
        .await
        .with_toast(Flash::error(message));
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        form_page(shell, title, action, form),
    )
        .into_response()
}

/// Create a journey.
#[instrument(skip(staff, state, session, form))]
async fn create(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<JourneyForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return invalid_form(
                &staff,
                &session,
                "Tambah Customer Journey",
                "/journeys".to_string(),
                form,
                message,
            )
            .await;
        }
    };

    let flash = match JourneyRepository::new(state.pool()).create(&input).await {
        Ok(journey) => {
            tracing::info!(journey_id = %journey.id, "Journey created");
            Flash::success("Customer journey berhasil ditambahkan")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create journey");
            Flash::error("Gagal menyimpan customer journey")
        }
    };
    redirect_with(&session, flash, "/journeys").await.into_response()
}

/// Update a journey.
#[instrument(skip(staff, state, session, form))]
async fn update(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<JourneyId>,
    Form(form): Form<JourneyForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return invalid_form(
                &staff,
                &session,
                "Edit Customer Journey",
                format!("/journeys/{id}"),
                form,
                message,
            )
            .await;
        }
    };

    let flash = match JourneyRepository::new(state.pool()).update(id, &input).await {
        Ok(_) => Flash::success("Customer journey berhasil diperbarui"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update journey");
            Flash::error("Gagal menyimpan customer journey")
        }
    };
    redirect_with(&session, flash, "/journeys").await.into_response()
}

/// Flip the follow-up flag of one journey.
#[instrument(skip(_staff, state, session))]
async fn toggle_follow_up(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<JourneyId>,
) -> Redirect {
    let flash = match JourneyRepository::new(state.pool()).toggle_follow_up(id).await {
        Ok(journey) if journey.follow_up => Flash::success("Customer journey ditandai perlu follow up"),
        Ok(_) => Flash::success("Tanda follow up dihapus"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to toggle follow up");
            Flash::error("Gagal mengubah status follow up")
        }
    };
    redirect_with(&session, flash, "/journeys").await
}

/// Delete a journey.
#[instrument(skip(_staff, state, session))]
async fn delete(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<JourneyId>,
) -> Redirect {
    let flash = match JourneyRepository::new(state.pool()).delete(id).await {
        Ok(()) => Flash::success("Customer journey berhasil dihapus"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete journey");
            Flash::error("Gagal menghapus customer journey")
        }
    };
    redirect_with(&session, flash, "/journeys").await
}

/// Download journeys matching the search as CSV.
#[instrument(skip(_staff, state))]
async fn export(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<JourneyQuery>,
) -> Result<CsvDownload, AppError> {
    let journeys: Vec<Journey> = JourneyRepository::new(state.pool())
        .list_all()
        .await?
        .into_iter()
        .filter(|j| j.matches_search(&query.q))
        .collect();
    Ok(CsvDownload::build("journeys", state.today(), &journeys)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_checkbox_and_stage() {
        let form = JourneyForm {
            phone_number: " 08123456789 ".to_string(),
            customer_journey: "pelanggan_nego".to_string(),
            follow_up: Some("on".to_string()),
            ..JourneyForm::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.stage, JourneyStage::Negotiating);
        assert!(input.follow_up);
        assert_eq!(input.phone_number.as_deref(), Some("08123456789"));
        assert_eq!(input.message, None);
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let form = JourneyForm {
            customer_journey: "pelanggan_hilang".to_string(),
            ..JourneyForm::default()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_stage_options_select_one() {
        let options = stage_options("pelanggan_beli");
        assert_eq!(options.len(), 6);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }
}
