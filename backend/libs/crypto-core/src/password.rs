/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    TooShort,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hash a password with a fresh random salt.
///
/// Returns a PHC-formatted string safe for storage.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC hash in constant time.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_valid_password() {
        let hash = hash_password("secret123").expect("should hash password successfully");
        assert!(verify_password("secret123", &hash).expect("should verify successfully"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("secret123").expect("should hash password successfully");
        assert!(!verify_password("secret124", &hash).expect("verification should succeed"));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(hash_password("12345"), Err(PasswordError::TooShort)));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hash1 = hash_password("secret123").unwrap();
        let hash2 = hash_password("secret123").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("secret123", "not-a-phc-string"),
            Err(PasswordError::InvalidHash(_))
        ));
    }
}
