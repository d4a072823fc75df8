//! Reusable view pieces shared by every page.

pub mod nav;

pub use nav::{NavItem, menu_for};
