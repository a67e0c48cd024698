use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::auth::{PasswordError, TokenError};
use crate::store::StoreError;

/// Every failure a handler can surface, rendered as a JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body")]
    InvalidBody(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("user with this email or username already exists, please login")]
    Conflict,
    #[error("{message}")]
    Server { message: String, details: String },
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    pub fn server(message: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ApiError::Server {
            message: message.into(),
            details: err.to_string(),
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            ApiError::InvalidBody(details) => Some(details.as_str()),
            ApiError::Server { details, .. } => Some(details.as_str()),
            _ => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Server { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            details: self.details(),
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => ApiError::Conflict,
            StoreError::Database(e) => ApiError::server("database error", e),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::server("unable to generate password hash", err)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Sign(e) => ApiError::server("failed to generate token", e),
            TokenError::Invalid(_) => ApiError::Unauthorized("Invalid or expired token".into()),
        }
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        ApiError::server("background task failed", err)
    }
}
