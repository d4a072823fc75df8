//! Page chrome shared by every signed-in screen: sidebar, staff badge, toasts.

use chrono::{DateTime, FixedOffset, Utc};
use tower_sessions::Session;

use crate::components::{NavItem, menu_for};
use crate::middleware::take_flash;
use crate::models::{CurrentStaff, Flash};

/// Signed-in staff user as templates see it.
#[derive(Debug, Clone)]
pub struct StaffView {
    pub username: String,
    /// First letter of the username, for the avatar.
    pub initial: String,
    pub role_label: String,
    pub is_admin: bool,
}

impl From<&CurrentStaff> for StaffView {
    fn from(staff: &CurrentStaff) -> Self {
        Self {
            username: staff.username.clone(),
            initial: staff
                .username
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default(),
            role_label: staff.role.label().to_string(),
            is_admin: staff.is_admin(),
        }
    }
}

/// A sidebar entry with its active state resolved for the current page.
#[derive(Debug, Clone)]
pub struct NavLink {
    pub title: &'static str,
    pub href: &'static str,
    pub description: &'static str,
    pub glyph: &'static str,
    pub active: bool,
}

impl NavLink {
    fn resolve(item: NavItem, current_path: &str) -> Self {
        Self {
            title: item.title,
            href: item.href,
            description: item.description,
            glyph: item.glyph,
            active: item.is_active(current_path),
        }
    }
}

/// Everything `base.html` needs around the page body.
#[derive(Debug, Clone)]
pub struct PageShell {
    pub staff: StaffView,
    pub current_path: String,
    pub nav: Vec<NavLink>,
    pub toasts: Vec<Flash>,
    /// Comma-separated tables whose changes refresh this page; empty for none.
    pub watch_tables: String,
}

impl PageShell {
    /// Build the chrome, consuming any pending flash toast.
    pub async fn new(staff: &CurrentStaff, current_path: &str, session: &Session) -> Self {
        Self {
            staff: StaffView::from(staff),
            current_path: current_path.to_string(),
            nav: menu_for(staff.role)
                .into_iter()
                .map(|item| NavLink::resolve(item, current_path))
                .collect(),
            toasts: take_flash(session).await.into_iter().collect(),
            watch_tables: String::new(),
        }
    }

    /// Refresh the page when any of `tables` changes.
    #[must_use]
    pub fn watching(mut self, tables: &[&str]) -> Self {
        self.watch_tables = tables.join(",");
        self
    }

    /// Add a toast for this render only.
    #[must_use]
    pub fn with_toast(mut self, toast: Flash) -> Self {
        self.toasts.push(toast);
        self
    }

    /// Add `message` as an error toast when `failed` is set.
    #[must_use]
    pub fn with_load_error(self, failed: bool, message: &str) -> Self {
        if failed {
            self.with_toast(Flash::error(message))
        } else {
            self
        }
    }

    /// The sidebar entry for the current page, if any.
    #[must_use]
    pub fn active_link(&self) -> Option<&NavLink> {
        self.nav.iter().find(|link| link.active)
    }
}

/// Format an instant as `dd/mm/yyyy HH:MM` in the business timezone.
#[must_use]
pub fn local_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string()
}

/// Like [`local_time`], with `-` for a missing value.
#[must_use]
pub fn local_time_opt(at: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    at.map_or_else(|| "-".to_string(), |at| local_time(at, offset))
}
