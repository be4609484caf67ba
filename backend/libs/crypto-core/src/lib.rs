//! Auth primitives shared by blog platform services
//!
//! - `jwt`: bearer token issuance and validation (HS256)
//! - `password`: Argon2id credential hashing and verification

pub mod jwt;
pub mod password;

pub use password::{hash_password, verify_password, PasswordError};
