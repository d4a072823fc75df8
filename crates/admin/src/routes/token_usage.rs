//! Token usage analytics (`"TokenUsage"`).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cs_console_core::TimeRange;

use crate::db::TokenUsageRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireStaffAuth;
use crate::models::Flash;
use crate::services::token_usage::TOKEN_RANGES;
use crate::services::{CsvDownload, TokenUsageReport, build_report, demo_report};
use crate::state::AppState;

use super::dashboard::{RangeOption, parse_range, range_options};
use super::shell::PageShell;

/// One day's bar in the usage chart.
#[derive(Debug, Clone)]
pub struct TokenBar {
    pub label: String,
    pub input: i64,
    pub output: i64,
    pub total: i64,
    pub percent: u32,
}

/// Token usage page template.
#[derive(Template, WebTemplate)]
#[template(path = "token_usage/index.html")]
pub struct TokenUsageTemplate {
    pub shell: PageShell,
    pub ranges: Vec<RangeOption>,
    pub range: &'static str,
    pub input_total: i64,
    pub output_total: i64,
    pub total: i64,
    pub bars: Vec<TokenBar>,
    pub is_demo: bool,
}

#[derive(Debug, Deserialize)]
pub struct TokenUsageQuery {
    pub range: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token-usage", get(index))
        .route("/token-usage/export.csv", get(export))
}

async fn fetch_report(state: &AppState, range: TimeRange) -> Result<TokenUsageReport, AppError> {
    let offset = state.offset();
    let window = range.window(state.today());
    let records = TokenUsageRepository::new(state.pool())
        .list_between(window.start_utc(offset), window.end_utc(offset))
        .await?;
    Ok(build_report(range, window, offset, &records))
}

/// Token usage page. A failed read shows demo data with an info toast.
#[instrument(skip(staff, state, session))]
async fn index(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<TokenUsageQuery>,
) -> TokenUsageTemplate {
    let range = parse_range(query.range.as_deref(), &TOKEN_RANGES);
    let report = match fetch_report(&state, range).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(error = %e, "Token usage unavailable, using demo data");
            demo_report(range, range.window(state.today()), &mut rand::rng())
        }
    };

    let mut shell = PageShell::new(&staff, "/token-usage", &session)
        .await
        .watching(&["TokenUsage"]);
    if report.is_demo {
        shell = shell.with_toast(Flash::info(
            "Using Demo Data",
            "Token usage data not available, showing demo data",
        ));
    }

    TokenUsageTemplate {
        shell,
        ranges: range_options(&TOKEN_RANGES, range),
        range: range.as_str(),
        input_total: report.input_total,
        output_total: report.output_total,
        total: report.total,
        bars: report
            .days
            .iter()
            .map(|day| TokenBar {
                label: day.label.clone(),
                input: day.input,
                output: day.output,
                total: day.total,
                percent: report.percent_of_peak(day),
            })
            .collect(),
        is_demo: report.is_demo,
    }
}

/// Download the per-day report as CSV. Never exports demo data.
#[instrument(skip(_staff, state))]
async fn export(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<TokenUsageQuery>,
) -> Result<CsvDownload, AppError> {
    let range = parse_range(query.range.as_deref(), &TOKEN_RANGES);
    let report = fetch_report(&state, range).await?;
    Ok(CsvDownload::build("token-usage", state.today(), &report.days)?)
}
