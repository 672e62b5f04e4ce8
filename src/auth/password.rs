use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

use crate::errors::ValidationError;

/// Hash a password using `Argon2id`.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored `Argon2id` hash.
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Passwords are 8 to 128 characters.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPassword`] describing the violated rule.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if length < 8 {
        return Err(ValidationError::InvalidPassword(
            "must be at least 8 characters".to_string(),
        ));
    }
    if length > 128 {
        return Err(ValidationError::InvalidPassword(
            "must be at most 128 characters".to_string(),
        ));
    }
    Ok(())
}

/// Usernames are 3 to 50 letters, digits or underscores.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidUsername`] describing the violated rule.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let length = username.chars().count();
    if length < 3 {
        return Err(ValidationError::InvalidUsername(
            "must be at least 3 characters".to_string(),
        ));
    }
    if length > 50 {
        return Err(ValidationError::InvalidUsername(
            "must be at most 50 characters".to_string(),
        ));
    }
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidUsername(
            "may only contain letters, numbers, and underscores".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap_or_default();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap_or(false));
        assert!(!verify_password("wrong horse", &hash).unwrap_or(true));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("anything", "not-a-hash").is_err());
    }

    #[test]
    fn test_password_length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("exactly8").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }
}
