//! Caller identity from request headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Actor, UserRole};

pub const ROLE_HEADER: &str = "x-ecoclear-role";
pub const ACTOR_HEADER: &str = "x-ecoclear-actor";

/// Resolve `(role, id)` from the identity headers.
///
/// # Errors
///
/// `401` when either header is missing or does not parse.
pub fn actor_from_parts(parts: &Parts) -> Result<Actor, ApiError> {
    let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());

    let role = header(ROLE_HEADER)
        .and_then(UserRole::parse)
        .ok_or_else(|| ApiError::unauthorized(format!("missing or invalid {ROLE_HEADER}")))?;
    let id = header(ACTOR_HEADER)
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .ok_or_else(|| ApiError::unauthorized(format!("missing or invalid {ACTOR_HEADER}")))?;
    Ok(Actor::new(role, id))
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_parts(parts)
    }
}

#[cfg(test)]
#[path = "actor_test.rs"]
mod tests;
