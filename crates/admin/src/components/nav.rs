//! Sidebar navigation.

use cs_console_core::StaffRole;

/// Brand shown at the top of the sidebar.
pub const BRAND_NAME: &str = "Cozmeed";

/// Subtitle under the brand.
pub const BRAND_SUBTITLE: &str = "Admin Panel";

/// Heading of the menu group.
pub const MENU_GROUP: &str = "Menu Utama";

/// One sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub href: &'static str,
    pub description: &'static str,
    /// Single-letter glyph used when the sidebar is collapsed.
    pub glyph: &'static str,
    pub admin_only: bool,
}

impl NavItem {
    /// Whether this entry is the current page.
    ///
    /// `/` only matches exactly; every other entry matches its whole subtree.
    #[must_use]
    pub fn is_active(&self, current_path: &str) -> bool {
        if self.href == "/" {
            return current_path == "/";
        }
        current_path == self.href
            || current_path
                .strip_prefix(self.href)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Every sidebar entry, in menu order.
pub const MENU: [NavItem; 9] = [
    NavItem {
        title: "Dashboard",
        href: "/dashboard",
        description: "Overview dan Analytics",
        glyph: "D",
        admin_only: false,
    },
    NavItem {
        title: "Hold Manager",
        href: "/",
        description: "Kelola Nomor Hold",
        glyph: "H",
        admin_only: true,
    },
    NavItem {
        title: "Customer Journey",
        href: "/journeys",
        description: "Tracking Perjalanan Pelanggan",
        glyph: "J",
        admin_only: false,
    },
    NavItem {
        title: "Keluhan",
        href: "/complaints",
        description: "Manajemen Keluhan",
        glyph: "K",
        admin_only: false,
    },
    NavItem {
        title: "Produk",
        href: "/products",
        description: "Kelola Produk",
        glyph: "P",
        admin_only: false,
    },
    NavItem {
        title: "Promo",
        href: "/promos",
        description: "Manajemen Promo",
        glyph: "%",
        admin_only: false,
    },
    NavItem {
        title: "Pembelian",
        href: "/orders",
        description: "Kelola Order & Pembelian",
        glyph: "O",
        admin_only: false,
    },
    NavItem {
        title: "Token Usage",
        href: "/token-usage",
        description: "Pemakaian Token AI",
        glyph: "T",
        admin_only: false,
    },
    NavItem {
        title: "Style CS",
        href: "/style-cs",
        description: "Gaya Bahasa Bot",
        glyph: "S",
        admin_only: false,
    },
];

/// The entries a role may open.
#[must_use]
pub fn menu_for(role: StaffRole) -> Vec<NavItem> {
    MENU.into_iter()
        .filter(|item| !item.admin_only || role.can_manage_holds())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(href: &str) -> NavItem {
        MENU.into_iter()
            .find(|i| i.href == href)
            .unwrap()
    }

    #[test]
    fn test_root_matches_exactly() {
        let holds = item("/");
        assert!(holds.is_active("/"));
        assert!(!holds.is_active("/products"));
    }

    #[test]
    fn test_prefix_matches_subtree_only() {
        let products = item("/products");
        assert!(products.is_active("/products"));
        assert!(products.is_active("/products/abc/edit"));
        assert!(!products.is_active("/productsx"));
    }

    #[test]
    fn test_operator_menu_hides_holds() {
        let operator = menu_for(StaffRole::Operator);
        assert!(operator.iter().all(|i| i.href != "/"));
        assert_eq!(menu_for(StaffRole::Admin).len(), MENU.len());
    }
}
