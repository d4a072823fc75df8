//! Bot persona settings ("Style CS", the latest `"AIPrompt"` row).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::Redirect,
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{StylePrompt, StylePromptRepository};
use crate::middleware::RequireStaffAuth;
use crate::models::Flash;
use crate::services::Screen;
use crate::state::AppState;

use super::shell::{PageShell, local_time};
use super::{form_text, redirect_with};

const LOAD_FAILED: &str = "Gagal mengambil data Style CS";

/// The stored prompt as shown on the page.
#[derive(Debug, Clone)]
pub struct StyleView {
    pub gaya_bahasa: String,
    pub informasi_tambahan: String,
    pub updated_at: String,
}

/// Style CS page template.
#[derive(Template, WebTemplate)]
#[template(path = "style_cs/index.html")]
pub struct StyleCsTemplate {
    pub shell: PageShell,
    pub prompt: Option<StyleView>,
    pub form: StyleForm,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StyleForm {
    pub gaya_bahasa: String,
    pub informasi_tambahan: String,
}

impl From<&StylePrompt> for StyleForm {
    fn from(p: &StylePrompt) -> Self {
        Self {
            gaya_bahasa: p.gaya_bahasa.clone().unwrap_or_default(),
            informasi_tambahan: p.informasi_tambahan.clone().unwrap_or_default(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/style-cs", get(index).post(save))
}

/// Style CS page.
#[instrument(skip(staff, state, session))]
async fn index(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
) -> StyleCsTemplate {
    let repo = StylePromptRepository::new(state.pool());
    let loaded = state
        .snapshots()
        .load(Screen::StyleCs, async {
            repo.latest().await.map(|p| p.into_iter().collect::<Vec<_>>())
        })
        .await;

    let offset = state.offset();
    let shell = PageShell::new(&staff, "/style-cs", &session)
        .await
        .watching(&["AIPrompt"])
        .with_load_error(loaded.failed, LOAD_FAILED);

    let latest = loaded.rows.first();
    StyleCsTemplate {
        shell,
        form: latest.map(StyleForm::from).unwrap_or_default(),
        prompt: latest.map(|p| StyleView {
            gaya_bahasa: p
                .gaya_bahasa
                .clone()
                .unwrap_or_else(|| "Belum diatur".to_string()),
            informasi_tambahan: p
                .informasi_tambahan
                .clone()
                .unwrap_or_else(|| "Belum diatur".to_string()),
            updated_at: local_time(p.updated_at, offset),
        }),
    }
}

/// Update the latest prompt, or create the first one.
#[instrument(skip(_staff, state, session, form))]
async fn save(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<StyleForm>,
) -> Redirect {
    let repo = StylePromptRepository::new(state.pool());

    let existing = match repo.latest().await {
        Ok(latest) => latest.map(|p| p.id),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read current style");
            return redirect_with(&session, Flash::error("Gagal menyimpan Style CS"), "/style-cs").await;
        }
    };

    let gaya = form_text(&form.gaya_bahasa);
    let info = form_text(&form.informasi_tambahan);
    let flash = match repo.save(existing, gaya.as_deref(), info.as_deref()).await {
        Ok((_, true)) => Flash::success("Style CS berhasil dibuat"),
        Ok((_, false)) => Flash::success("Style CS berhasil diperbarui"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save style");
            if existing.is_some() {
                Flash::error("Gagal memperbarui Style CS")
            } else {
                Flash::error("Gagal membuat Style CS")
            }
        }
    };
    redirect_with(&session, flash, "/style-cs").await
}
