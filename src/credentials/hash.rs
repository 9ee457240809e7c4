//! Password hashing built on Argon2id.
//!
//! Hashes are stored as PHC strings, so the salt and parameters travel with
//! the hash and verification needs no external configuration.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
/// Returns an error if the hashing backend fails.
pub fn hash_password(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("Failed to hash password: {err}"))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// A malformed stored hash verifies as `false`; the comparison itself is the
/// constant-time primitive provided by the hash backend.
#[must_use]
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}
