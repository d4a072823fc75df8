//! Dashboard: today's cards, range totals and per-day charts.

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

use cs_console_core::{StaffRole, TimeRange};

use crate::middleware::RequireStaffAuth;
use crate::services::MetricsService;
use crate::services::metrics::{ChartPoint, DashboardMetrics, MetricTotals};
use crate::state::AppState;

use super::shell::PageShell;

/// Ranges offered by the dashboard picker.
pub const DASHBOARD_RANGES: [TimeRange; 4] = [
    TimeRange::Today,
    TimeRange::SevenDays,
    TimeRange::ThirtyDays,
    TimeRange::OneYear,
];

const LOAD_FAILED: &str = "Gagal memuat data metrik";

const ADMIN_ACCESS: &[&str] = &[
    "Pengelola Responder WhatsApp (Hold Management)",
    "Semua metrik operasional",
    "Manajemen Promo (CRUD lengkap)",
    "Manajemen Produk (CRUD lengkap)",
];

const OPERATOR_ACCESS: &[&str] = &[
    "Metrik chat harian",
    "Manajemen Promo (CRUD lengkap)",
    "Manajemen Produk (Tambah dan Edit)",
];

/// What each role may do, as listed on the dashboard.
#[must_use]
pub const fn access_list(role: StaffRole) -> &'static [&'static str] {
    match role {
        StaffRole::Admin => ADMIN_ACCESS,
        StaffRole::Operator => OPERATOR_ACCESS,
    }
}

/// One option of the range picker.
#[derive(Debug, Clone)]
pub struct RangeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Build picker options with `selected` marked.
#[must_use]
pub fn range_options(ranges: &[TimeRange], selected: TimeRange) -> Vec<RangeOption> {
    ranges
        .iter()
        .map(|&range| RangeOption {
            value: range.as_str(),
            label: range.label(),
            selected: range == selected,
        })
        .collect()
}

/// Parse the `range` query value, falling back to the default range.
#[must_use]
pub fn parse_range(value: Option<&str>, allowed: &[TimeRange]) -> TimeRange {
    value
        .and_then(|v| v.parse::<TimeRange>().ok())
        .filter(|range| allowed.contains(range))
        .unwrap_or_default()
}

/// A bar chart on the dashboard.
#[derive(Debug, Clone)]
pub struct ChartView {
    pub title: &'static str,
    pub points: Vec<ChartPoint>,
}

/// Card values for the business day containing "now".
#[derive(Debug, Clone, Default)]
pub struct TodayCards {
    pub chats: i64,
    pub complaints: i64,
    pub checkouts: i64,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub shell: PageShell,
    pub greeting: String,
    pub description: String,
    pub sees_all_metrics: bool,
    pub ranges: Vec<RangeOption>,
    pub range_label: &'static str,
    pub window_label: String,
    pub today: TodayCards,
    pub totals: MetricTotals,
    pub charts: Vec<ChartView>,
    pub role_label: &'static str,
    pub access: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub range: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// Charts for a role; operators only see chat volume.
fn charts_for(metrics: &DashboardMetrics, role: StaffRole) -> Vec<ChartView> {
    let mut charts = vec![ChartView {
        title: "Chat per Hari",
        points: metrics.series(|d| d.chats),
    }];
    if role.sees_all_metrics() {
        charts.push(ChartView {
            title: "Keluhan per Hari",
            points: metrics.series(|d| d.complaints),
        });
        charts.push(ChartView {
            title: "Checkout per Hari",
            points: metrics.series(|d| d.checkouts),
        });
        charts.push(ChartView {
            title: "Pesanan per Hari",
            points: metrics.series(|d| d.orders),
        });
    }
    charts
}

/// Dashboard page handler.
#[instrument(skip(staff, state, session))]
async fn dashboard(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<DashboardQuery>,
) -> DashboardTemplate {
    let range = parse_range(query.range.as_deref(), &DASHBOARD_RANGES);
    let metrics = MetricsService::new(state.pool(), state.offset())
        .dashboard(range, state.today())
        .await;

    let shell = PageShell::new(&staff, "/dashboard", &session)
        .await
        .watching(&["Keluhan", "Cart", "Order", "conversations_log", "daily_metrics"])
        .with_load_error(metrics.degraded, LOAD_FAILED);

    let window_label = format!(
        "{} - {}",
        metrics.window.first().format("%d/%m/%Y"),
        metrics.window.last().format("%d/%m/%Y")
    );

    DashboardTemplate {
        greeting: format!("Selamat Datang, {}!", staff.username),
        description: format!("Dashboard {} - Akses sesuai peran Anda", staff.role.label()),
        sees_all_metrics: staff.role.sees_all_metrics(),
        ranges: range_options(&DASHBOARD_RANGES, range),
        range_label: range.label(),
        window_label,
        today: TodayCards {
            chats: metrics.today.chats,
            complaints: metrics.today.complaints,
            checkouts: metrics.today.checkouts,
        },
        totals: metrics.totals.clone(),
        charts: charts_for(&metrics, staff.role),
        role_label: staff.role.label(),
        access: access_list(staff.role),
        shell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_falls_back_to_default() {
        assert_eq!(parse_range(Some("30days"), &DASHBOARD_RANGES), TimeRange::ThirtyDays);
        assert_eq!(parse_range(Some("bogus"), &DASHBOARD_RANGES), TimeRange::SevenDays);
        assert_eq!(parse_range(None, &DASHBOARD_RANGES), TimeRange::SevenDays);
        // Valid range, but not offered on this screen
        assert_eq!(parse_range(Some("this_month"), &DASHBOARD_RANGES), TimeRange::SevenDays);
    }

    #[test]
    fn test_range_options_mark_selection() {
        let options = range_options(&DASHBOARD_RANGES, TimeRange::Today);
        assert_eq!(options.len(), 4);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert_eq!(options.iter().find(|o| o.selected).map(|o| o.value), Some("today"));
    }

    #[test]
    fn test_operator_access_excludes_holds() {
        assert!(!access_list(StaffRole::Operator).iter().any(|a| a.contains("Hold")));
        assert!(access_list(StaffRole::Admin).iter().any(|a| a.contains("Hold")));
    }
}
