/*
 * Responsibility
 * - Re-extract verified claims from an already-authorized event
 * - Identity check of the caller against a resource owner
 */
use http::StatusCode;
use serde_json::{Map, Value};

use crate::error::{AppError, AuthErrorKind};
use crate::event::GatewayEvent;
use crate::response::{ApiResponse, ResponseParts, make_response};

/// Parse the stringified claims blob the authorizer attached to the event.
///
/// A missing blob means the gateway never ran the authorizer for this route,
/// which is a configuration bug, not a client error; it is classified
/// `auth/authorizer_error` so it stands out from token failures.
pub fn user_claims(event: &GatewayEvent) -> Result<Map<String, Value>, AppError> {
    let claims = event
        .request_context
        .authorizer
        .as_ref()
        .and_then(|authorizer| authorizer.claims.as_deref())
        .ok_or_else(|| {
            AppError::auth(AuthErrorKind::AuthorizerError, "No claims found in request")
        })?;

    serde_json::from_str(claims)
        .map_err(|e| AppError::internal(format!("failed to parse authorizer claims: {e}")))
}

/// The caller's subject identifier (`sub` claim).
pub fn user_id(event: &GatewayEvent) -> Result<String, AppError> {
    let claims = user_claims(event)?;
    match claims.get("sub") {
        Some(Value::String(sub)) => Ok(sub.clone()),
        _ => Err(AppError::auth(
            AuthErrorKind::AuthorizerError,
            "No sub claim found in request",
        )),
    }
}

/// Result of an owner check.
#[derive(Debug)]
pub enum AccessCheck {
    Allowed,
    /// Pre-built 403 response, returned (not raised) so callers can hand it
    /// straight back without branching.
    Forbidden(Box<ApiResponse>),
}

impl AccessCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Check that the caller owns the resource identified by `user_id`.
pub fn is_user_allowed(event: &GatewayEvent, user_id: &str) -> Result<AccessCheck, AppError> {
    let sub = self::user_id(event)?;
    if sub == user_id {
        return Ok(AccessCheck::Allowed);
    }

    let error = AppError::auth(
        AuthErrorKind::NotAllowed,
        format!("User {user_id} is not the same as user who has a claim to this resource: {sub}"),
    );

    Ok(AccessCheck::Forbidden(Box::new(make_response(
        ResponseParts::failure(error),
        StatusCode::FORBIDDEN,
    ))))
}
