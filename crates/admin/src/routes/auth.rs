//! Staff sign-in and sign-out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::components::nav::{BRAND_NAME, BRAND_SUBTITLE};
use crate::error::clear_sentry_user;
use crate::middleware::{OptionalStaffAuth, clear_current_staff, set_current_staff};
use crate::models::CurrentStaff;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Username atau password salah";
const LOGIN_FAILED: &str = "Gagal masuk, silakan coba lagi";

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub brand_name: &'static str,
    pub brand_subtitle: &'static str,
    pub username: String,
    pub error: Option<String>,
}

impl LoginTemplate {
    fn new(username: String, error: Option<&str>) -> Self {
        Self {
            brand_name: BRAND_NAME,
            brand_subtitle: BRAND_SUBTITLE,
            username,
            error: error.map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Show the login form, or send a signed-in user to their home screen.
#[instrument(skip_all)]
async fn login_page(OptionalStaffAuth(staff): OptionalStaffAuth) -> Response {
    match staff {
        Some(staff) => Redirect::to(staff.home_path()).into_response(),
        None => LoginTemplate::new(String::new(), None).into_response(),
    }
}

/// Verify credentials and start a session.
///
/// Admins land on the holds screen, operators on the dashboard.
#[instrument(skip(state, session, form), fields(username = %form.username))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login rejected");
            return (
                StatusCode::UNAUTHORIZED,
                LoginTemplate::new(form.username, Some(INVALID_CREDENTIALS)),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                LoginTemplate::new(form.username, Some(LOGIN_FAILED)),
            )
                .into_response();
        }
    };

    let staff = CurrentStaff::from(&user);
    if let Err(e) = set_current_staff(&session, &staff).await {
        tracing::error!(error = %e, "Failed to store session");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            LoginTemplate::new(form.username, Some(LOGIN_FAILED)),
        )
            .into_response();
    }

    tracing::info!(role = %staff.role, "Staff signed in");
    Redirect::to(staff.home_path()).into_response()
}

/// End the session.
#[instrument(skip_all)]
async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_staff(&session).await {
        tracing::warn!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    Redirect::to("/auth/login")
}
