//! One-shot toast messages carried in the session.
//!
//! A write handler stores a [`Flash`] and redirects; the next page render
//! takes it out again, so each toast shows exactly once.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Queue a toast for the next render, replacing any pending one.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take the pending toast, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    match session.remove::<Flash>(session_keys::FLASH).await {
        Ok(flash) => flash,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash message");
            None
        }
    }
}
