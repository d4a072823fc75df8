//! Staff user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a staff user
//! cs-cli user create -u siti -p 'long-password' -r admin
//!
//! # Reset a password
//! cs-cli user set-password -u siti -p 'new-long-password'
//! ```
//!
//! # Environment Variables
//!
//! - `CONSOLE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use thiserror::Error;
use uuid::Uuid;

use cs_console_admin::services::{AuthError, AuthService};
use cs_console_core::StaffRole;

use super::{CommandError, connect};

/// Errors that can occur during staff user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, operator")]
    InvalidRole(String),

    /// Username taken, weak password, or a database failure.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Parse a role name as typed on the command line.
fn parse_role(role: &str) -> Result<StaffRole, UserError> {
    role.trim()
        .to_lowercase()
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))
}

/// Create a new staff user.
///
/// # Returns
///
/// The ID of the created staff user.
pub async fn create(username: &str, password: &str, role: &str) -> Result<Uuid, UserError> {
    let role = parse_role(role)?;
    let pool = connect().await?;

    tracing::info!("Creating staff user: {} ({})", username.trim(), role);
    let user = AuthService::new(&pool)
        .create_user(username, password, role)
        .await?;

    tracing::info!(
        "Staff user created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(user.id)
}

/// Replace an existing staff user's password.
pub async fn set_password(username: &str, password: &str) -> Result<(), UserError> {
    let pool = connect().await?;

    AuthService::new(&pool)
        .set_password(username, password)
        .await?;

    tracing::info!("Password updated for {}", username.trim());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_is_case_insensitive() {
        assert_eq!(parse_role("Admin").unwrap(), StaffRole::Admin);
        assert_eq!(parse_role(" operator ").unwrap(), StaffRole::Operator);
    }

    #[test]
    fn test_parse_role_rejects_unknown() {
        assert!(matches!(parse_role("super_admin"), Err(UserError::InvalidRole(_))));
    }
}
