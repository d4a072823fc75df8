//! Unified error handling for the console.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::CurrentStaff;
use crate::services::auth::AuthError;
use crate::services::export::ExportError;
use crate::services::metrics::MetricsError;

/// Application-level error type for the console.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Metrics computation or storage failed.
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// CSV export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Metrics(MetricsError::InvalidDate(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(
                AuthError::InvalidUsername(_)
                | AuthError::WeakPassword(_)
                | AuthError::UserAlreadyExists,
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_)
            | Self::Metrics(_)
            | Self::Export(_)
            | Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Console request error"
            );
        }

        (status, self.public_message()).into_response()
    }
}

/// Set the Sentry user context from the signed-in staff user.
pub fn set_sentry_user(staff: &CurrentStaff) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(staff.id.to_string()),
            username: Some(staff.username.clone()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("promo p-1".to_string());
        assert_eq!(err.to_string(), "Not found: promo p-1");

        let err = AppError::BadRequest("nama wajib diisi".to_string());
        assert_eq!(err.to_string(), "Bad request: nama wajib diisi");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Metrics(MetricsError::InvalidDate("x".to_string()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Export(ExportError::Flush("closed".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "role column holds 'root'".to_string(),
        ));
        assert_eq!(err.public_message(), "Internal server error");
    }
}
