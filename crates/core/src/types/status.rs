//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Staff role with different permission levels.
///
/// Stored as plain text in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    /// Full access, including the hold list, deletions and all metrics.
    Admin,
    /// Day-to-day catalog and customer work; no hold list, no deletes of products.
    Operator,
}

impl StaffRole {
    /// Human-readable label shown in the console.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Operator => "Operator",
        }
    }

    /// Whether this role may manage the bot hold list.
    #[must_use]
    pub const fn can_manage_holds(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may delete catalog products.
    #[must_use]
    pub const fn can_delete_products(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role sees complaint and checkout metrics.
    #[must_use]
    pub const fn sees_all_metrics(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Operator => write!(f, "operator"),
        }
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "operator" => Ok(Self::Operator),
            _ => Err(format!("invalid staff role: {s}")),
        }
    }
}

/// Order processing status.
///
/// The bot writes these as upper-case strings. Anything unknown is kept
/// verbatim in [`OrderStatus::Other`] so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Draft,
    Processing,
    Completed,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// Statuses staff may set from the console.
    pub const SETTABLE: [Self; 4] = [
        Self::Draft,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Parse a stored status string. Never fails.
    #[must_use]
    pub fn from_db(s: &str) -> Self {
        match s {
            "DRAFT" => Self::Draft,
            "PROCESSING" => Self::Processing,
            "COMPLETED" => Self::Completed,
            "CANCELLED" => Self::Cancelled,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The string stored in the database.
    #[must_use]
    pub fn as_db(&self) -> &str {
        match self {
            Self::Draft => "DRAFT",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Other(s) => s,
        }
    }

    /// Indonesian label shown to staff.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Draft => "Draft",
            Self::Processing => "Diproses",
            Self::Completed => "Selesai",
            Self::Cancelled => "Dibatalkan",
            Self::Other(s) => s,
        }
    }

    /// CSS badge class for this status.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Processing => "badge-blue",
            Self::Completed => "badge-green",
            Self::Cancelled => "badge-red",
            Self::Draft | Self::Other(_) => "badge-gray",
        }
    }

    /// Whether this status may be set from the console.
    #[must_use]
    pub const fn is_settable(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        Self::from_db(&s)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_db().to_owned()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db())
    }
}

/// Customer journey stage in the sales funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStage {
    /// Customer asked a question.
    #[default]
    #[serde(rename = "pelanggan_tanya")]
    Asking,
    /// Customer showed interest.
    #[serde(rename = "pelanggan_tertarik")]
    Interested,
    /// Customer is negotiating.
    #[serde(rename = "pelanggan_nego")]
    Negotiating,
    /// Customer bought.
    #[serde(rename = "pelanggan_beli")]
    Purchased,
    /// Customer complained.
    #[serde(rename = "pelanggan_komplain")]
    Complaining,
    /// Customer is due a follow-up.
    #[serde(rename = "pelanggan_follow_up")]
    FollowUp,
}

impl JourneyStage {
    /// All stages in funnel order.
    pub const ALL: [Self; 6] = [
        Self::Asking,
        Self::Interested,
        Self::Negotiating,
        Self::Purchased,
        Self::Complaining,
        Self::FollowUp,
    ];

    /// The string stored in the database.
    #[must_use]
    pub const fn as_db(self) -> &'static str {
        match self {
            Self::Asking => "pelanggan_tanya",
            Self::Interested => "pelanggan_tertarik",
            Self::Negotiating => "pelanggan_nego",
            Self::Purchased => "pelanggan_beli",
            Self::Complaining => "pelanggan_komplain",
            Self::FollowUp => "pelanggan_follow_up",
        }
    }

    /// Label shown in selects and badges.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asking => "Pelanggan tanya",
            Self::Interested => "Pelanggan tertarik",
            Self::Negotiating => "Pelanggan nego",
            Self::Purchased => "Pelanggan beli",
            Self::Complaining => "Pelanggan komplain",
            Self::FollowUp => "Pelanggan follow up",
        }
    }

    /// CSS badge class for this stage.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Asking => "badge-blue",
            Self::Interested => "badge-green",
            Self::Negotiating => "badge-yellow",
            Self::Purchased => "badge-emerald",
            Self::Complaining => "badge-red",
            Self::FollowUp => "badge-purple",
        }
    }
}

impl std::fmt::Display for JourneyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db())
    }
}

impl std::str::FromStr for JourneyStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_db() == s)
            .ok_or_else(|| format!("invalid journey stage: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_role_roundtrip() {
        for role in [StaffRole::Admin, StaffRole::Operator] {
            assert_eq!(role.to_string().parse::<StaffRole>().unwrap(), role);
        }
        assert!("super_admin".parse::<StaffRole>().is_err());
    }

    #[test]
    fn test_staff_role_permissions() {
        assert!(StaffRole::Admin.can_manage_holds());
        assert!(!StaffRole::Operator.can_manage_holds());
        assert!(!StaffRole::Operator.can_delete_products());
        assert!(!StaffRole::Operator.sees_all_metrics());
    }

    #[test]
    fn test_order_status_known_values() {
        assert_eq!(OrderStatus::from_db("PROCESSING"), OrderStatus::Processing);
        assert_eq!(OrderStatus::Completed.as_db(), "COMPLETED");
        assert_eq!(OrderStatus::Cancelled.label(), "Dibatalkan");
    }

    #[test]
    fn test_order_status_unknown_is_preserved() {
        let status = OrderStatus::from_db("WAITING_PAYMENT");
        assert_eq!(status, OrderStatus::Other("WAITING_PAYMENT".to_owned()));
        assert_eq!(status.label(), "WAITING_PAYMENT");
        assert!(!status.is_settable());
    }

    #[test]
    fn test_order_status_serde_uses_db_strings() {
        // serde goes through From<String>/Into<String>
        let s: String = OrderStatus::Processing.into();
        assert_eq!(s, "PROCESSING");
        assert_eq!(OrderStatus::from("DRAFT".to_owned()), OrderStatus::Draft);
    }

    #[test]
    fn test_journey_stage_parse() {
        for stage in JourneyStage::ALL {
            assert_eq!(stage.as_db().parse::<JourneyStage>().unwrap(), stage);
        }
        assert!("pelanggan_kabur".parse::<JourneyStage>().is_err());
    }
}
