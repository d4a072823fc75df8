//! Product catalogue (`"Produk"`).
//!
//! Both roles may add and edit; only admins may delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{Product, ProductInput, ProductRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireStaffAuth;
use crate::models::{CurrentStaff, Flash};
use crate::services::{CsvDownload, Screen};
use crate::state::AppState;

use super::shell::{PageShell, local_time};
use super::{form_text, redirect_with};

const LOAD_FAILED: &str = "Gagal mengambil data produk";

/// A product row for the list.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub nama: String,
    pub deskripsi: String,
    pub kategori: String,
    /// Decimal text, or `-`.
    pub harga: String,
    pub stok: String,
    pub ukuran: String,
    pub warna: String,
    pub updated_at: String,
}

/// Products list template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub shell: PageShell,
    pub products: Vec<ProductView>,
    pub can_delete: bool,
}

/// Add/edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub shell: PageShell,
    pub title: &'static str,
    pub action: String,
    pub form: ProductForm,
}

/// Raw product form fields, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub nama: String,
    pub deskripsi: String,
    pub kategori: String,
    pub harga: String,
    pub stok: String,
    pub berat: String,
    pub ukuran: String,
    pub warna: String,
}

fn opt_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl From<&Product> for ProductForm {
    fn from(p: &Product) -> Self {
        Self {
            nama: p.nama.clone(),
            deskripsi: p.deskripsi.clone().unwrap_or_default(),
            kategori: p.kategori.clone().unwrap_or_default(),
            harga: opt_string(p.harga),
            stok: opt_string(p.stok),
            berat: opt_string(p.berat),
            ukuran: p.ukuran.clone().unwrap_or_default(),
            warna: p.warna.clone().unwrap_or_default(),
        }
    }
}

/// Parse an optional non-negative number; blank means `None`.
fn non_negative<T>(value: &str, field: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(text) = form_text(value) else {
        return Ok(None);
    };
    match text.parse::<T>() {
        Ok(n) if n >= T::default() => Ok(Some(n)),
        _ => Err(format!("{field} harus berupa angka yang tidak negatif")),
    }
}

impl ProductForm {
    /// Validate the form into a repository input.
    ///
    /// # Errors
    ///
    /// Returns the message to show when a field is missing or malformed.
    pub fn validate(&self) -> Result<ProductInput, String> {
        let nama = form_text(&self.nama).ok_or("Nama produk wajib diisi")?;
        Ok(ProductInput {
            nama,
            deskripsi: form_text(&self.deskripsi),
            kategori: form_text(&self.kategori),
            harga: non_negative::<Decimal>(&self.harga, "Harga")?,
            stok: non_negative::<i32>(&self.stok, "Stok")?,
            berat: non_negative::<f64>(&self.berat, "Berat")?,
            ukuran: form_text(&self.ukuran),
            warna: form_text(&self.warna),
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new_page))
        .route("/products/export.csv", get(export))
        .route("/products/{id}", post(update))
        .route("/products/{id}/edit", get(edit_page))
        .route("/products/{id}/delete", post(delete))
}

async fn form_shell(staff: &CurrentStaff, session: &Session) -> PageShell {
    PageShell::new(staff, "/products", session).await
}

/// Products list page.
#[instrument(skip(staff, state, session))]
async fn index(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
) -> ProductsTemplate {
    let loaded = state
        .snapshots()
        .load(Screen::Products, ProductRepository::new(state.pool()).list_all())
        .await;

    let offset = state.offset();
    let shell = PageShell::new(&staff, "/products", &session)
        .await
        .watching(&["Produk"])
        .with_load_error(loaded.failed, LOAD_FAILED);

    ProductsTemplate {
        shell,
        can_delete: staff.role.can_delete_products(),
        products: loaded
            .rows
            .iter()
            .map(|p| ProductView {
                id: p.id.clone(),
                nama: p.nama.clone(),
                deskripsi: p.deskripsi.clone().unwrap_or_default(),
                kategori: p.kategori.clone().unwrap_or_else(|| "-".to_string()),
                harga: p.harga.map_or_else(|| "-".to_string(), |h| h.to_string()),
                stok: p.stok.map_or_else(|| "-".to_string(), |s| s.to_string()),
                ukuran: p.ukuran.clone().unwrap_or_else(|| "-".to_string()),
                warna: p.warna.clone().unwrap_or_else(|| "-".to_string()),
                updated_at: local_time(p.updated_at, offset),
            })
            .collect(),
    }
}

/// Empty add form.
#[instrument(skip(staff, session))]
async fn new_page(RequireStaffAuth(staff): RequireStaffAuth, session: Session) -> ProductFormTemplate {
    ProductFormTemplate {
        shell: form_shell(&staff, &session).await,
        title: "Tambah Produk",
        action: "/products".to_string(),
        form: ProductForm::default(),
    }
}

/// Edit form prefilled from the stored row.
#[instrument(skip(staff, state, session))]
async fn edit_page(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<ProductFormTemplate, AppError> {
    let product = ProductRepository::new(state.pool())
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductFormTemplate {
        shell: form_shell(&staff, &session).await,
        title: "Edit Produk",
        action: format!("/products/{id}"),
        form: ProductForm::from(&product),
    })
}

/// Re-render a rejected form with the typed values kept.
async fn invalid_form(
    staff: &CurrentStaff,
    session: &Session,
    title: &'static str,
    action: String,
    form: ProductForm,
    message: String,
) -> Response {
    let template = ProductFormTemplate {
        shell: form_shell(staff, session)
            .await
            .with_toast(Flash::error(message)),
        title,
        action,
        form,
    };
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Create a product.
#[instrument(skip(staff, state, session, form))]
async fn create(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return invalid_form(&staff, &session, "Tambah Produk", "/products".to_string(), form, message)
                .await;
        }
    };

    let flash = match ProductRepository::new(state.pool()).create(&input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product created");
            Flash::success("Produk berhasil ditambahkan")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create product");
            Flash::error("Gagal menambahkan produk")
        }
    };
    redirect_with(&session, flash, "/products").await.into_response()
}

/// Update a product.
#[instrument(skip(staff, state, session, form))]
async fn update(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return invalid_form(&staff, &session, "Edit Produk", format!("/products/{id}"), form, message)
                .await;
        }
    };

    let flash = match ProductRepository::new(state.pool()).update(&id, &input).await {
        Ok(_) => Flash::success("Produk berhasil diperbarui"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update product");
            Flash::error("Gagal memperbarui produk")
        }
    };
    redirect_with(&session, flash, "/products").await.into_response()
}

/// Delete a product (admin only).
#[instrument(skip(staff, state, session))]
async fn delete(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Redirect {
    if !staff.role.can_delete_products() {
        tracing::warn!("Operator tried to delete a product");
        return redirect_with(
            &session,
            Flash::error("Hanya admin yang dapat menghapus produk"),
            "/products",
        )
        .await;
    }

    let flash = match ProductRepository::new(state.pool()).delete(&id).await {
        Ok(()) => {
            tracing::info!("Product deleted");
            Flash::success("Produk berhasil dihapus")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete product");
            Flash::error("Gagal menghapus produk")
        }
    };
    redirect_with(&session, flash, "/products").await
}

/// Download the catalogue as CSV.
#[instrument(skip(_staff, state))]
async fn export(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
) -> Result<CsvDownload, AppError> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(CsvDownload::build("products", state.today(), &products)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(nama: &str, harga: &str, stok: &str, berat: &str) -> ProductForm {
        ProductForm {
            nama: nama.to_string(),
            harga: harga.to_string(),
            stok: stok.to_string(),
            berat: berat.to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_valid_form_parses_numbers() {
        let input = form(" Kaos Polos ", "125000.50", "12", "250").validate().unwrap();
        assert_eq!(input.nama, "Kaos Polos");
        assert_eq!(input.harga, Some(Decimal::new(12_500_050, 2)));
        assert_eq!(input.stok, Some(12));
        assert_eq!(input.berat, Some(250.0));
        assert_eq!(input.kategori, None);
    }

    #[test]
    fn test_blank_numbers_are_none() {
        let input = form("Topi", "", " ", "").validate().unwrap();
        assert_eq!(input.harga, None);
        assert_eq!(input.stok, None);
        assert_eq!(input.berat, None);
    }

    #[test]
    fn test_name_is_required() {
        assert_eq!(
            form("  ", "1000", "", "").validate().unwrap_err(),
            "Nama produk wajib diisi"
        );
    }

    #[test]
    fn test_negative_and_malformed_numbers_rejected() {
        assert!(form("Kaos", "-1", "", "").validate().is_err());
        assert!(form("Kaos", "", "-3", "").validate().is_err());
        assert!(form("Kaos", "", "", "abc").validate().is_err());
        assert!(form("Kaos", "", "1.5", "").validate().is_err());
    }
}
