//! JSON API: daily metrics job trigger.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::DayMetrics;
use crate::middleware::RequireAdmin;
use crate::services::MetricsService;
use crate::services::metrics::{MetricsError, parse_metric_date};
use crate::state::AppState;

/// Request body; an empty body or missing date means today.
#[derive(Debug, Default, Deserialize)]
pub struct StoreDailyRequest {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StoreDailyResponse {
    pub success: bool,
    pub message: String,
    pub data: DayMetrics,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    fn response(status: StatusCode, error: impl Into<String>) -> Response {
        (
            status,
            Json(Self {
                success: false,
                error: error.into(),
            }),
        )
            .into_response()
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/metrics/daily", post(store_daily))
}

/// Resolve the target day from a raw request body.
///
/// # Errors
///
/// Returns a message when the body is not JSON or the date is malformed.
pub fn target_day(body: &[u8], today: NaiveDate) -> Result<NaiveDate, String> {
    let request: StoreDailyRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StoreDailyRequest::default()
    } else {
        serde_json::from_slice(body).map_err(|e| format!("invalid request body: {e}"))?
    };

    match request.date.as_deref().map(str::trim) {
        None | Some("") => Ok(today),
        Some(value) => parse_metric_date(value).map_err(|e| e.to_string()),
    }
}

/// POST /api/metrics/daily
#[instrument(skip(_staff, state, body))]
async fn store_daily(
    RequireAdmin(_staff): RequireAdmin,
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    let day = match target_day(&body, state.today()) {
        Ok(day) => day,
        Err(e) => return ApiError::response(StatusCode::BAD_REQUEST, e),
    };

    match MetricsService::new(state.pool(), state.offset()).store_daily(day).await {
        Ok(data) => Json(StoreDailyResponse {
            success: true,
            message: format!("Daily metrics stored for {day}"),
            data,
        })
        .into_response(),
        Err(MetricsError::InvalidDate(value)) => {
            ApiError::response(StatusCode::BAD_REQUEST, format!("invalid date: {value}"))
        }
        Err(e) => {
            tracing::error!(error = %e, %day, "Failed to store daily metrics");
            ApiError::response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store daily metrics")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    #[test]
    fn test_empty_body_means_today() {
        assert_eq!(target_day(b"", today()).unwrap(), today());
        assert_eq!(target_day(b"{}", today()).unwrap(), today());
        assert_eq!(target_day(br#"{"date":""}"#, today()).unwrap(), today());
    }

    #[test]
    fn test_explicit_date() {
        assert_eq!(
            target_day(br#"{"date":"2024-03-31"}"#, today()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
    }

    #[test]
    fn test_bad_input_rejected() {
        assert!(target_day(br#"{"date":"31/03/2024"}"#, today()).is_err());
        assert!(target_day(b"not json", today()).is_err());
    }
}
