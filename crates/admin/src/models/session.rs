//! Session-related types for staff authentication and toasts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cs_console_core::StaffRole;

use crate::db::StaffUser;

/// Session-stored staff identity.
///
/// Minimal data stored in the session to identify the signed-in staff user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStaff {
    /// Staff user's database ID.
    pub id: Uuid,
    /// Login name, also shown in the greeting.
    pub username: String,
    /// Access level.
    pub role: StaffRole,
}

impl CurrentStaff {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, StaffRole::Admin)
    }

    /// Where to land right after signing in.
    #[must_use]
    pub const fn home_path(&self) -> &'static str {
        if self.role.can_manage_holds() {
            "/"
        } else {
            "/dashboard"
        }
    }
}

impl From<&StaffUser> for CurrentStaff {
    fn from(user: &StaffUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    /// CSS class for the toast container.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "toast-success",
            Self::Error => "toast-error",
            Self::Info => "toast-info",
        }
    }
}

/// A one-shot toast message carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub title: Option<String>,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            title: None,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            title: None,
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            title: Some(title.into()),
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in staff user.
    pub const CURRENT_STAFF: &str = "current_staff";

    /// Key for the pending toast.
    pub const FLASH: &str = "flash";
}
