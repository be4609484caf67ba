/// Shared JWT module for blog platform services
///
/// Tokens are HS256-signed with a single service secret. The secret is
/// installed once at startup and is immutable afterwards.
///
/// ## Usage
///
/// ```rust,ignore
/// use crypto_core::jwt;
///
/// let secret = std::env::var("JWT_SECRET")?;
/// jwt::initialize_jwt_secret(&secret, 720)?;
///
/// let token = jwt::generate_access_token(user_id)?;
/// let claims = jwt::validate_token(&token)?.claims;
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Secrets shorter than this are rejected at initialization
pub const MIN_SECRET_LEN: usize = 32;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 720;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type, always "access"
    pub token_type: String,
}

struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

// ============================================================================
// Key Storage
// ============================================================================

static JWT_KEYS: OnceCell<JwtKeys> = OnceCell::new();

/// Install the signing secret and token lifetime.
///
/// Can only be called once per process; later calls return an error.
pub fn initialize_jwt_secret(secret: &str, ttl_hours: i64) -> Result<()> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(anyhow!(
            "JWT secret must be at least {MIN_SECRET_LEN} bytes"
        ));
    }
    if ttl_hours <= 0 {
        return Err(anyhow!("JWT lifetime must be positive"));
    }

    JWT_KEYS
        .set(JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        })
        .map_err(|_| anyhow!("JWT secret already initialized"))
}

pub fn is_initialized() -> bool {
    JWT_KEYS.get().is_some()
}

fn keys() -> Result<&'static JwtKeys> {
    JWT_KEYS.get().ok_or_else(|| {
        anyhow!("JWT secret not initialized. Call initialize_jwt_secret() during startup.")
    })
}

// ============================================================================
// Token Generation
// ============================================================================

pub fn generate_access_token(user_id: Uuid) -> Result<String> {
    let keys = keys()?;
    let now = Utc::now();
    let expiry = now + Duration::hours(keys.ttl_hours);

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        token_type: "access".to_string(),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, &keys.encoding)
        .map_err(|e| anyhow!("Failed to generate access token: {e}"))
}

// ============================================================================
// Token Validation
// ============================================================================

/// Validate signature, algorithm and expiry of a bearer token
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let keys = keys()?;

    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 0;

    let data = decode::<Claims>(token, &keys.decoding, &validation)
        .map_err(|e| anyhow!("Token validation failed: {e}"))?;

    if data.claims.token_type != "access" {
        return Err(anyhow!("Unexpected token type: {}", data.claims.token_type));
    }

    Ok(data)
}

/// Validate the token and extract the user id it was issued for
pub fn get_user_id_from_token(token: &str) -> Result<Uuid> {
    let token_data = validate_token(token)?;
    Uuid::parse_str(&token_data.claims.sub)
        .map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    const TEST_SECRET: &str = "unit-test-secret-key-at-least-32-bytes!!";

    static INIT: Once = Once::new();

    fn init_test_keys() {
        INIT.call_once(|| {
            initialize_jwt_secret(TEST_SECRET, 1).expect("Failed to initialize test secret");
        });
    }

    #[test]
    fn test_generate_and_validate_token() {
        init_test_keys();

        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id).expect("Failed to generate token");
        let claims = validate_token(&token).expect("Failed to validate").claims;

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_extract_user_id() {
        init_test_keys();

        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id).unwrap();
        assert_eq!(get_user_id_from_token(&token).unwrap(), user_id);
    }

    #[test]
    fn test_rejects_garbage() {
        init_test_keys();
        assert!(validate_token("invalid.token.format").is_err());
        assert!(validate_token("").is_err());
    }

    #[test]
    fn test_rejects_foreign_signature() {
        init_test_keys();

        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            token_type: "access".to_string(),
        };
        let forged = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret-that-is-long-enough!!"),
        )
        .unwrap();

        assert!(validate_token(&forged).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        init_test_keys();

        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            token_type: "access".to_string(),
        };
        let expired = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&expired).is_err());
    }

    #[test]
    fn test_second_initialization_fails() {
        init_test_keys();
        assert!(initialize_jwt_secret(TEST_SECRET, 1).is_err());
    }
}
