//! HTTP route handlers for the console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready           - Liveness and readiness
//!
//! # Auth
//! GET  /auth/login                      - Login page
//! POST /auth/login                      - Username/password sign-in
//! POST /auth/logout                     - Sign out
//!
//! # Dashboard
//! GET  /dashboard?range=                - Metric cards and charts
//!
//! # Holds (admin only)
//! GET  /                                - Responder hold list
//! POST /holds                           - Put a number on hold
//! POST /holds/{phone}/toggle            - Flip a number's hold flag
//!
//! # Catalogue
//! GET  /products, /promos               - Lists
//! GET  /{products,promos}/new           - Create forms
//! POST /{products,promos}               - Create
//! GET  /{products,promos}/{id}/edit     - Edit forms
//! POST /{products,promos}/{id}          - Update
//! POST /{products,promos}/{id}/delete   - Delete
//!
//! # Customer service
//! GET  /orders                          - Orders with cart summaries
//! POST /orders/{id}/status              - Set order status
//! GET  /complaints?filter=              - Complaints
//! POST /complaints/{id}/toggle          - Flip handled flag
//! GET  /journeys?q=                     - Customer journeys (+ CRUD)
//! POST /journeys/{id}/follow-up         - Flip follow-up flag
//! GET  /token-usage?range=              - Token usage report
//! GET  /style-cs, POST /style-cs        - Bot persona settings
//!
//! # Every list screen
//! GET  /<screen>/export.csv             - CSV download
//!
//! # API
//! GET  /api/events?table=               - Table change stream (SSE)
//! POST /api/metrics/daily               - Store one day's metrics
//! ```

use axum::{Router, response::Redirect};
use tower_sessions::Session;

use crate::middleware::set_flash;
use crate::models::Flash;
use crate::state::AppState;

pub mod api;
pub mod auth;
pub mod complaints;
pub mod dashboard;
pub mod events;
pub mod health;
pub mod holds;
pub mod journeys;
pub mod orders;
pub mod products;
pub mod promos;
pub mod shell;
pub mod style_cs;
pub mod token_usage;

/// Build all console routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(holds::router())
        .merge(products::router())
        .merge(promos::router())
        .merge(orders::router())
        .merge(complaints::router())
        .merge(journeys::router())
        .merge(token_usage::router())
        .merge(style_cs::router())
        .merge(events::router())
        .merge(api::router())
}

/// Queue a toast and redirect; the toast shows on the next render.
pub(crate) async fn redirect_with(session: &Session, flash: Flash, to: &str) -> Redirect {
    set_flash(session, flash).await;
    Redirect::to(to)
}

/// Trimmed form text, or `None` when blank.
pub(crate) fn form_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
