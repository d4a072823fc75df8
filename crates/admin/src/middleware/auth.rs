//! Authentication extractors for the console.
//!
//! `RequireStaffAuth` admits any signed-in staff user; `RequireAdmin` admits
//! only the `admin` role. Both redirect HTML requests to the login page and
//! answer API requests with a bare status code.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::{CurrentStaff, session_keys};

/// Extractor that requires a signed-in staff user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireStaffAuth(staff): RequireStaffAuth,
/// ) -> impl IntoResponse {
///     format!("Selamat Datang, {}!", staff.username)
/// }
/// ```
pub struct RequireStaffAuth(pub CurrentStaff);

/// Extractor that requires a signed-in `admin`.
///
/// Operators are sent to `/dashboard` on HTML routes and get 403 on API routes.
pub struct RequireAdmin(pub CurrentStaff);

/// Why an auth extractor rejected the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in but the role may not open this page.
    RedirectToDashboard,
    /// Signed in but the role may not call this API.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::RedirectToDashboard => Redirect::to("/dashboard").into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only admins can access this resource",
            )
                .into_response(),
        }
    }
}

fn is_api(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/api/")
}

async fn current_staff(parts: &Parts) -> Result<CurrentStaff, AuthRejection> {
    // Set by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let staff: CurrentStaff = session
        .get(session_keys::CURRENT_STAFF)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| {
            if is_api(parts) {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })?;

    set_sentry_user(&staff);
    Ok(staff)
}

impl<S> FromRequestParts<S> for RequireStaffAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_staff(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let staff = current_staff(parts).await?;
        if !staff.is_admin() {
            return Err(if is_api(parts) {
                AuthRejection::Forbidden
            } else {
                AuthRejection::RedirectToDashboard
            });
        }
        Ok(Self(staff))
    }
}

/// Extractor that optionally gets the current staff user.
pub struct OptionalStaffAuth(pub Option<CurrentStaff>);

impl<S> FromRequestParts<S> for OptionalStaffAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let staff = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentStaff>(session_keys::CURRENT_STAFF)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(staff))
    }
}

/// Store the signed-in staff user in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_staff(
    session: &Session,
    staff: &CurrentStaff,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_STAFF, staff).await
}

/// Clear the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_staff(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
