//! One-way password hashing with Argon2id.
//!
//! The PHC string output embeds algorithm, parameters, and salt, so
//! verification needs nothing but the stored value. The async wrappers run
//! the KDF on the blocking pool; request handling must never stall behind a
//! deliberately slow hash.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password off the async executor.
///
/// # Errors
///
/// Returns an error if hashing fails or the blocking task is cancelled.
pub async fn hash(plaintext: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_blocking(&plaintext))
        .await
        .context("password hashing task failed")?
}

/// Verify a plaintext password off the async executor.
///
/// # Errors
///
/// Returns an error if the stored hash is unparseable or the blocking task
/// is cancelled. A wrong password is `Ok(false)`, not an error.
pub async fn verify(plaintext: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_blocking(&plaintext, &stored_hash))
        .await
        .context("password verification task failed")?
}

/// Synchronous hash, with a fresh random salt per call.
///
/// # Errors
///
/// Returns an error if the KDF rejects the input.
pub fn hash_blocking(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Synchronous verify against a stored PHC string.
///
/// # Errors
///
/// Returns an error when the stored hash cannot be parsed; corrupt
/// credential rows must surface, never silently fail closed as a mismatch.
pub fn verify_blocking(plaintext: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| anyhow!("stored password hash is invalid: {err}"))?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(anyhow!("failed to verify password: {err}")),
    }
}
