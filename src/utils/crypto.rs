use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::{Error, Result};

pub fn hash_password(plain: &str) -> std::result::Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(plain.as_bytes(), &salt)?.to_string();
    Ok(password_hash)
}

/// Returns `false` for a wrong password and for a digest that does not
/// parse as a PHC string.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hashed) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("stored password hash is malformed: {}", e);
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}

pub async fn hash_password_async(plain: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await?
        .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))
}

pub async fn verify_password_async(plain: String, hashed: String) -> Result<bool> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&plain, &hashed)).await?)
}
