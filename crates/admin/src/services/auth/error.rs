//! Staff authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during staff authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password is wrong. Does not say which.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Username is blank or malformed.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// A staff user with that username already exists.
    #[error("staff user already exists")]
    UserAlreadyExists,

    /// Password hashing failed.
    #[error("failed to hash password")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
