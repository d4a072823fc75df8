//! Session and view models for the console.

pub mod session;

pub use session::{CurrentStaff, Flash, FlashKind, keys as session_keys};
