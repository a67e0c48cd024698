use std::sync::Arc;

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(#[from] BcryptError);

/// bcrypt hashing at a fixed cost.
///
/// Keeps a hash of a throwaway password so that a login for an unknown email
/// still pays for one bcrypt verification.
#[derive(Clone)]
pub struct Passwords {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl Passwords {
    pub fn new() -> Result<Self, PasswordError> {
        Self::with_cost(DEFAULT_COST)
    }

    /// Anything below `DEFAULT_COST` is only meant for tests.
    pub fn with_cost(cost: u32) -> Result<Self, PasswordError> {
        let dummy_hash = hash("timing-equalization-placeholder", cost)?;
        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(hash(plaintext, self.cost)?)
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, stored_hash: &str, plaintext: &str) -> bool {
        verify(plaintext, stored_hash).unwrap_or(false)
    }

    /// Burns the same work as `verify` against a hash nobody can match.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = verify(plaintext, &self.dummy_hash);
    }
}
