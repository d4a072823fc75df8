//! Staff authentication service.
//!
//! Username/password sign-in against the `users` table. Passwords are stored
//! as Argon2id PHC strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use cs_console_core::StaffRole;

use crate::db::RepositoryError;
use crate::db::users::{StaffUser, StaffUserRepository};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length.
const MAX_USERNAME_LENGTH: usize = 64;

/// Staff authentication service.
pub struct AuthService<'a> {
    users: StaffUserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: StaffUserRepository::new(pool),
        }
    }

    /// Sign in with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password does not match.
    pub async fn login(&self, username: &str, password: &str) -> Result<StaffUser, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let (user, password_hash) = self
            .users
            .get_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Create a staff user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` or `AuthError::WeakPassword` on
    /// bad input, `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: StaffRole,
    ) -> Result<StaffUser, AuthError> {
        let username = validate_username(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users
            .create(username, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Replace a staff user's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short, or
    /// `AuthError::Repository` if the user does not exist.
    pub async fn set_password(&self, username: &str, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        self.users
            .set_password_hash(username.trim(), &password_hash)
            .await?;
        Ok(())
    }
}

/// Validate a username: non-blank, bounded, no inner whitespace.
fn validate_username(username: &str) -> Result<&str, AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::InvalidUsername("username is required".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidUsername(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidUsername(
            "username must not contain spaces".to_string(),
        ));
    }
    Ok(username)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is malformed or the
/// password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
