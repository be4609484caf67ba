/// Error types for Post Service
///
/// Every handler returns `Result<_, AppError>`; the `ResponseError` impl turns
/// each variant into a JSON body of the shape
/// `{"error", "message", "status", "errors"?}`.
use crate::db::StoreError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// One field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to start server: {0}")]
    StartServer(String),
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Unauthorized(_) | Self::InvalidCredentials => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::NotFound(_) => "NotFound",
            Self::Conflict(_) => "Conflict",
            Self::Store(_) => "StoreError",
            Self::Internal(_) | Self::Config(_) | Self::StartServer(_) => "InternalError",
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Internal(_) | Self::Config(_) | Self::StartServer(_)
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Internal(_) | Self::Config(_) | Self::StartServer(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let message = if self.is_internal() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut body = serde_json::json!({
            "error": self.kind(),
            "message": message,
            "status": status.as_u16(),
        });
        if let Self::Validation(errors) = self {
            body["errors"] = serde_json::json!(errors);
        }

        HttpResponse::build(status).json(body)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Store(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"));
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(fields)
    }
}

impl From<crypto_core::PasswordError> for AppError {
    fn from(err: crypto_core::PasswordError) -> Self {
        match err {
            crypto_core::PasswordError::TooShort => {
                AppError::validation("password", &err.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> serde_json::Value {
        let resp = err.error_response();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation("title", "required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(StoreError::Conflict("email".into())).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[actix_web::test]
    async fn test_store_error_detail_is_hidden() {
        let body = body_json(AppError::Store("connection refused on 10.0.0.5".into())).await;
        assert_eq!(body["status"], 500);
        assert_eq!(body["message"], "internal server error");
    }

    #[actix_web::test]
    async fn test_validation_body_lists_fields() {
        let body = body_json(AppError::validation("text", "Comment text is required")).await;
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(body["errors"][0]["field"], "text");
    }
}
