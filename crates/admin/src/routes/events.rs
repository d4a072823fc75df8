//! Table change stream for open pages.
//!
//! `GET /api/events?table=Order,Cart` streams one `change` event per
//! coalesced burst of changes to the listed tables; the page re-fetches when
//! it sees one.

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Query, State},
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::instrument;

use crate::middleware::RequireStaffAuth;
use crate::services::{COALESCE_WINDOW, TableFilter, coalesced};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub table: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/events", get(events))
}

/// GET /api/events
#[instrument(skip(_staff, state))]
async fn events(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = TableFilter::parse(query.table.as_deref());
    let changes = coalesced(state.changes().subscribe(), filter, COALESCE_WINDOW);

    let sse_stream = changes.map(|change| {
        let json = serde_json::to_string(&change)
            .unwrap_or_else(|_| r#"{"table":"*"}"#.to_string());
        Ok(Event::default().event("change").data(json))
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}
