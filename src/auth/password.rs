use anyhow::Context;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use secrecy::{ExposeSecret, Secret};

use crate::error::{RestError, RestResult};

/// Hash a raw password with a fresh salt for storage.
///
/// CPU-bound; call through `spawn_blocking_with_tracing` on the async runtime.
pub fn hash_password(password: Secret<String>) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .context("Failed to hash password")?
        .to_string();

    Ok(password_hash)
}

/// Verify a presented password against a stored PHC-format hash.
///
/// CPU-bound; call through `spawn_blocking_with_tracing` on the async runtime.
pub fn verify_password_hash(
    password: Secret<String>,
    password_hash: Secret<String>,
) -> RestResult<()> {
    let password_hash = PasswordHash::new(password_hash.expose_secret())
        .context("Failed to parse stored password hash")?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &password_hash)
        .context("Failed to verify password hash")
        .map_err(RestError::FailedToAuthenticate)?;

    Ok(())
}
