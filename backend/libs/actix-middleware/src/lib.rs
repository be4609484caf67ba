//! # Actix Middleware Library
//!
//! Shared middleware components for blog platform Actix services
//!
//! ## Modules
//! - `jwt_auth`: bearer token authentication and the `UserId` extractor
//! - `logging`: request/response logging through tracing
//! - `request_id`: `x-request-id` propagation

pub mod jwt_auth;
pub mod logging;
pub mod request_id;

pub use jwt_auth::{JwtAuthMiddleware, UserId};
pub use logging::Logging;
pub use request_id::{RequestId, RequestIdValue};
