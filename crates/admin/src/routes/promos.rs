//! Promotions (`"Promo"`), optionally linked to a product.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{ProductRepository, Promo, PromoInput, PromoRepository};
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::models::{CurrentStaff, Flash};
use crate::services::{CsvDownload, Screen};
use crate::state::AppState;

use super::shell::PageShell;
use super::{form_text, redirect_with};

const LOAD_FAILED: &str = "Gagal mengambil data promo";

/// A promo row for the list.
#[derive(Debug, Clone)]
pub struct PromoView {
    pub id: String,
    pub judul_promo: String,
    pub nama: String,
    pub jenis: String,
    pub product_nama: String,
    pub tanggal_mulai: String,
    pub tanggal_selesai: String,
    pub is_active: bool,
}

impl PromoView {
    fn new(promo: &Promo, today: NaiveDate) -> Self {
        let date = |d: Option<NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.format("%d/%m/%Y").to_string());
        Self {
            id: promo.id.clone(),
            judul_promo: promo.judul_promo.clone().unwrap_or_else(|| "-".to_string()),
            nama: promo.nama.clone(),
            jenis: promo.jenis.clone().unwrap_or_else(|| "-".to_string()),
            product_nama: promo.product_nama.clone().unwrap_or_else(|| "-".to_string()),
            tanggal_mulai: date(promo.tanggal_mulai),
            tanggal_selesai: date(promo.tanggal_selesai),
            is_active: promo.is_active_on(today),
        }
    }
}

/// A product choice in the promo form.
#[derive(Debug, Clone)]
pub struct ProductOption {
    pub id: String,
    pub nama: String,
    pub selected: bool,
}

/// Promos list template.
#[derive(Template, WebTemplate)]
#[template(path = "promos/index.html")]
pub struct PromosTemplate {
    pub shell: PageShell,
    pub promos: Vec<PromoView>,
}

/// Add/edit promo form template.
#[derive(Template, WebTemplate)]
#[template(path = "promos/form.html")]
pub struct PromoFormTemplate {
    pub shell: PageShell,
    pub title: &'static str,
    pub action: String,
    pub form: PromoForm,
    pub products: Vec<ProductOption>,
}

/// Raw promo form fields, as typed. Dates come from `<input type="date">`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromoForm {
    pub nama: String,
    pub judul_promo: String,
    pub jenis: String,
    pub deskripsi: String,
    pub product_id: String,
    pub syarat_ketentuan: String,
    pub tanggal_mulai: String,
    pub tanggal_selesai: String,
}

impl From<&Promo> for PromoForm {
    fn from(p: &Promo) -> Self {
        let date = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        Self {
            nama: p.nama.clone(),
            judul_promo: p.judul_promo.clone().unwrap_or_default(),
            jenis: p.jenis.clone().unwrap_or_default(),
            deskripsi: p.deskripsi.clone().unwrap_or_default(),
            product_id: p.product_id.clone().unwrap_or_default(),
            syarat_ketentuan: p.syarat_ketentuan.clone().unwrap_or_default(),
            tanggal_mulai: date(p.tanggal_mulai),
            tanggal_selesai: date(p.tanggal_selesai),
        }
    }
}

fn required_date(value: &str, field: &str) -> Result<NaiveDate, String> {
    let text = form_text(value).ok_or_else(|| format!("{field} wajib diisi"))?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| format!("{field} tidak valid"))
}

impl PromoForm {
    /// Validate the form into a repository input.
    ///
    /// # Errors
    ///
    /// Returns the message to show when a field is missing or malformed.
    pub fn validate(&self) -> Result<PromoInput, String> {
        let nama = form_text(&self.nama).ok_or("Nama promo wajib diisi")?;
        let judul_promo = form_text(&self.judul_promo).ok_or("Judul promo wajib diisi")?;
        let tanggal_mulai = required_date(&self.tanggal_mulai, "Tanggal mulai")?;
        let tanggal_selesai = required_date(&self.tanggal_selesai, "Tanggal selesai")?;
        if tanggal_selesai < tanggal_mulai {
            return Err("Tanggal selesai tidak boleh sebelum tanggal mulai".to_string());
        }

        Ok(PromoInput {
            nama,
            judul_promo,
            jenis: form_text(&self.jenis),
            deskripsi: form_text(&self.deskripsi),
            product_id: form_text(&self.product_id),
            syarat_ketentuan: form_text(&self.syarat_ketentuan),
            tanggal_mulai,
            tanggal_selesai,
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/promos", get(index).post(create))
        .route("/promos/new", get(new_page))
        .route("/promos/export.csv", get(export))
        .route("/promos/{id}", post(update))
        .route("/promos/{id}/edit", get(edit_page))
        .route("/promos/{id}/delete", post(delete))
}

/// Products for the link select; a failed fetch just leaves it empty.
async fn product_options(state: &AppState, selected: &str) -> Vec<ProductOption> {
    match ProductRepository::new(state.pool()).list_all().await {
        Ok(products) => products
            .into_iter()
            .map(|p| ProductOption {
                selected: p.id == selected,
                id: p.id,
                nama: p.nama,
            })
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products for promo form");
            Vec::new()
        }
    }
}

async fn form_page(
    state: &AppState,
    staff: &CurrentStaff,
    session: &Session,
    title: &'static str,
    action: String,
    form: PromoForm,
) -> PromoFormTemplate {
    PromoFormTemplate {
        shell: PageShell::new(staff, "/promos", session).await,
        products: product_options(state, &form.product_id).await,
        title,
        action,
        form,
    }
}

/// Promos list page.
#[instrument(skip(staff, state, session))]
async fn index(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
) -> PromosTemplate {
    let loaded = state
        .snapshots()
        .load(Screen::Promos, PromoRepository::new(state.pool()).list_all())
        .await;

    let today = state.today();
    let shell = PageShell::new(&staff, "/promos", &session)
        .await
        .watching(&["Promo", "Produk"])
        .with_load_error(loaded.failed, LOAD_FAILED);

    PromosTemplate {
        shell,
        promos: loaded.rows.iter().map(|p| PromoView::new(p, today)).collect(),
    }
}

/// Empty add form.
#[instrument(skip(staff, state, session))]
async fn new_page(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
) -> PromoFormTemplate {
    form_page(&state, &staff, &session, "Tambah Promo", "/promos".to_string(), PromoForm::default()).await
}

/// Edit form prefilled from the stored row.
#[instrument(skip(staff, state, session))]
async fn edit_page(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<PromoFormTemplate, AppError> {
    let promo = PromoRepository::new(state.pool())
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("promo {id}")))?;

    Ok(form_page(&state, &staff, &session, "Edit Promo", format!("/promos/{id}"), PromoForm::from(&promo)).await)
}

async fn invalid_form(
    state: &AppState,
    staff: &CurrentStaff,
    session: &Session,
    title: &'static str,
    action: String,
    form: PromoForm,
    message: String,
) -> Response {
    let mut template = form_page(state, staff, session, title, action, form).await;
    template.shell = template.shell.with_toast(Flash::error(message));
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Create a promo.
#[instrument(skip(staff, state, session, form))]
async fn create(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PromoForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return invalid_form(&state, &staff, &session, "Tambah Promo", "/promos".to_string(), form, message)
                .await;
        }
    };

    let flash = match PromoRepository::new(state.pool()).create(&input).await {
        Ok(id) => {
            tracing::info!(promo_id = %id, "Promo created");
            Flash::success("Promo berhasil ditambahkan")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create promo");
            Flash::error("Gagal menambahkan promo")
        }
    };
    redirect_with(&session, flash, "/promos").await.into_response()
}

/// Update a promo.
#[instrument(skip(staff, state, session, form))]
async fn update(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<PromoForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return invalid_form(&state, &staff, &session, "Edit Promo", format!("/promos/{id}"), form, message)
                .await;
        }
    };

    let flash = match PromoRepository::new(state.pool()).update(&id, &input).await {
        Ok(()) => Flash::success("Promo berhasil diperbarui"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update promo");
            Flash::error("Gagal memperbarui promo")
        }
    };
    redirect_with(&session, flash, "/promos").await.into_response()
}

/// Delete a promo.
#[instrument(skip(_staff, state, session))]
async fn delete(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Redirect {
    let flash = match PromoRepository::new(state.pool()).delete(&id).await {
        Ok(()) => Flash::success("Promo berhasil dihapus"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete promo");
            Flash::error("Gagal menghapus promo")
        }
    };
    redirect_with(&session, flash, "/promos").await
}

/// Download promos as CSV.
#[instrument(skip(_staff, state))]
async fn export(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
) -> Result<CsvDownload, AppError> {
    let promos = PromoRepository::new(state.pool()).list_all().await?;
    Ok(CsvDownload::build("promos", state.today(), &promos)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(start: &str, end: &str) -> PromoForm {
        PromoForm {
            nama: "Promo Lebaran".to_string(),
            judul_promo: "Diskon 20%".to_string(),
            tanggal_mulai: start.to_string(),
            tanggal_selesai: end.to_string(),
            ..PromoForm::default()
        }
    }

    #[test]
    fn test_valid_promo() {
        let input = form("2024-04-01", "2024-04-10").validate().unwrap();
        assert_eq!(input.tanggal_mulai, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(input.product_id, None);
    }

    #[test]
    fn test_single_day_promo_allowed() {
        assert!(form("2024-04-01", "2024-04-01").validate().is_ok());
    }

    #[test]
    fn test_end_before_start_rejected() {
        assert_eq!(
            form("2024-04-10", "2024-04-01").validate().unwrap_err(),
            "Tanggal selesai tidak boleh sebelum tanggal mulai"
        );
    }

    #[test]
    fn test_dates_required() {
        assert_eq!(form("", "2024-04-01").validate().unwrap_err(), "Tanggal mulai wajib diisi");
        assert_eq!(form("2024-04-01", "besok").validate().unwrap_err(), "Tanggal selesai tidak valid");
    }

    #[test]
    fn test_titles_required() {
        let mut f = form("2024-04-01", "2024-04-02");
        f.judul_promo = " ".to_string();
        assert_eq!(f.validate().unwrap_err(), "Judul promo wajib diisi");
    }
}
