//! Admin credential verification.
//!
//! # Invariants
//! - Passwords are stored only as salted Argon2id PHC strings.
//! - `verify` never panics and answers `false` for unknown users, malformed
//!   stored hashes and storage failures.

use crate::repo::admin_repo::AdminAccountRepository;
use crate::repo::RepoError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Capability that decides whether an admin credential is accepted.
pub trait AdminGate {
    fn verify(&self, username: &str, password: &str) -> bool;
}

impl<G: AdminGate + ?Sized> AdminGate for &G {
    fn verify(&self, username: &str, password: &str) -> bool {
        (**self).verify(username, password)
    }
}

/// Username/password pair presented by an organizer.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
}

impl AdminCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both parts present after trimming the username.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl Debug for AdminCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub enum AdminGateError {
    EmptyUsername,
    EmptyPassword,
    Hash(String),
    Repo(RepoError),
}

impl Display for AdminGateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "admin username must not be empty"),
            Self::EmptyPassword => write!(f, "admin password must not be empty"),
            Self::Hash(message) => write!(f, "failed to hash admin password: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AdminGateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AdminGateError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Admin gate backed by hashed account records.
pub struct PasswordAdminGate<R: AdminAccountRepository> {
    repo: R,
}

impl<R: AdminAccountRepository> PasswordAdminGate<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates or replaces one admin account.
    pub fn provision(&self, username: &str, password: &str) -> Result<(), AdminGateError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AdminGateError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(AdminGateError::EmptyPassword);
        }
        let hash = hash_password(password)?;
        self.repo.upsert_account(username, &hash)?;
        info!("event=admin_provision module=admin status=ok");
        Ok(())
    }
}

impl<R: AdminAccountRepository> AdminGate for PasswordAdminGate<R> {
    fn verify(&self, username: &str, password: &str) -> bool {
        let stored = match self.repo.password_hash(username.trim()) {
            Ok(Some(hash)) => hash,
            Ok(None) => return false,
            Err(err) => {
                warn!("event=admin_verify module=admin status=error error={err}");
                return false;
            }
        };
        verify_password(password, &stored)
    }
}

/// Hashes `password` with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AdminGateError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AdminGateError::Hash(err.to_string()))
}

/// Checks `password` against a stored PHC hash string.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        warn!("event=admin_verify module=admin status=error error_code=malformed_hash");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password, AdminCredential};

    #[test]
    fn hashes_verify_only_the_original_password() {
        let hash = hash_password("s3cret-pass").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong-pass", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password("same").expect("hashing should succeed");
        let second = hash_password("same").expect("hashing should succeed");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("plain", "plain"));
    }

    #[test]
    fn debug_output_redacts_password() {
        let credential = AdminCredential::new("root", "hunter2");
        let printed = format!("{credential:?}");
        assert!(printed.contains("root"));
        assert!(!printed.contains("hunter2"));
    }
}
