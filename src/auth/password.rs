//! Password hashing for the credential store.

use anyhow::{Context, Result};

/// Fixed bcrypt work factor. Raising it invalidates nothing (old hashes keep
/// their embedded cost) but slows new signups, so change with care.
pub const BCRYPT_COST: u32 = 12;

/// Hash a plaintext password with a per-hash random salt.
///
/// # Errors
///
/// Returns an error if bcrypt fails to produce a hash.
pub fn hash(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST).context("failed to hash password")
}

/// Check a plaintext password against a stored hash.
///
/// Delegates the comparison to bcrypt; hashes are never compared with string
/// equality.
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed.
pub fn verify(password: &str, password_hash: &str) -> Result<bool> {
    bcrypt::verify(password, password_hash).context("failed to verify password")
}
