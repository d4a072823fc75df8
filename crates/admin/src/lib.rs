//! CS console library.
//!
//! Internal customer-service console for the WhatsApp sales bot: hold list,
//! catalogue, promotions, orders, complaints, customer journeys, token usage
//! and the bot's persona settings, all over one `PostgreSQL` database.
//!
//! The binary in `main.rs` wires this library to the environment; tests build
//! the same router with [`app`] and an in-memory session store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = "crates/admin/static";

/// Build the console router: every route, static files, sessions and
/// request tracing.
///
/// Sentry layers are added by the binary on top of this.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(sessions)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
