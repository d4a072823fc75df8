//! HTTP middleware for the console.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Auth extractors on each handler (`RequireStaffAuth`, `RequireAdmin`)

pub mod auth;
pub mod flash;
pub mod session;

pub use auth::{
    AuthRejection, OptionalStaffAuth, RequireAdmin, RequireStaffAuth, clear_current_staff,
    set_current_staff,
};
pub use flash::{set_flash, take_flash};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, create_session_store, session_layer};
