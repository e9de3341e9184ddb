//! Password hashing, delegated to bcrypt.

use crate::error::{AppError, AppResult};

/// Hashes a plaintext password with a fresh salt
pub fn hash(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verifies a plaintext password against a stored hash. Malformed hashes
/// verify as false rather than erroring.
pub fn verify(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
