use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage, ResponseError};
use log::{error, warn};

use crate::error::ApiError;
use crate::models::Identity;
use crate::AppState;

/// Pulls the token out of an `Authorization` value. Exactly two
/// space-separated parts are accepted and the first must be `Bearer`.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Rejects the request with 401 unless it carries a valid bearer token. On
/// success the caller's `Identity` is stored in the request extensions.
pub async fn require_bearer(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    match authenticate(&req) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.call(req).await.map(|res| res.map_into_left_body())
        }
        Err(err) => {
            let response = err.error_response();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<Identity, ApiError> {
    let header = req.headers().get(AUTHORIZATION).ok_or_else(|| {
        warn!("Missing Authorization header on {}", req.path());
        ApiError::Unauthorized("Authorization header not found".into())
    })?;

    let token = header.to_str().ok().and_then(bearer_token).ok_or_else(|| {
        warn!("Malformed Authorization header on {}", req.path());
        ApiError::Unauthorized("Invalid authorization header format. Use Bearer <token>".into())
    })?;

    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        error!("Application state is not registered");
        ApiError::Internal("server misconfigured".into())
    })?;

    state.tokens.verify(token).map_err(|e| {
        warn!("Rejected token on {}: {}", req.path(), e);
        ApiError::Unauthorized("Invalid or expired token".into())
    })
}
