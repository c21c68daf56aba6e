//! Caller identity
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user's id in `x-user-id`.

use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dontq_core::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

fn user_id(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Authenticated caller; rejects with 401 when the header is missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id(parts)
            .map(AuthUser)
            .ok_or(ApiError::App(AppError::Unauthorized))
    }
}

/// Caller identity when present; never rejects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeUser(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_id(parts)))
    }
}
