//! Password credential hashing.
//!
//! The authorization core never sees plaintext beyond this boundary; stored
//! credentials are opaque PHC strings.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as PhcError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use thiserror::Error;

use taskhub_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("failed to hash credential: {0}")]
    Hash(String),

    #[error("stored credential is malformed: {0}")]
    Malformed(String),
}

impl From<CredentialError> for DomainError {
    fn from(err: CredentialError) -> Self {
        DomainError::Internal(err.to_string())
    }
}

pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// `Ok(false)` on mismatch; errors only for unusable stored hashes.
    fn verify(&self, password: &str, stored: &str) -> Result<bool, CredentialError>;
}

impl<T> CredentialHasher for Arc<T>
where
    T: CredentialHasher + ?Sized,
{
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        (**self).hash(password)
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, CredentialError> {
        (**self).verify(password, stored)
    }
}

/// Argon2id with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, CredentialError> {
        let parsed =
            PasswordHash::new(stored).map_err(|e| CredentialError::Malformed(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(e) => Err(CredentialError::Malformed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = Argon2Hasher;
        let stored = hasher.hash("correct horse").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &stored).unwrap());
        assert!(!hasher.verify("wrong horse", &stored).unwrap());
    }

    #[test]
    fn garbage_hash_is_malformed() {
        let err = Argon2Hasher.verify("pw", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, CredentialError::Malformed(_)));
    }
}
