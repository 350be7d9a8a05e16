/*
 * Responsibility
 * - IAM-style policy documents returned to the invoking gateway
 * - The authorizer boundary: verification outcome -> allow / deny / reject
 */
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

use crate::error::AuthErrorKind;
use crate::event::GatewayEvent;
use crate::services::auth::verifier::TokenVerifier;

pub const PRINCIPAL_ID: &str = "client";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    #[serde(rename = "Action")]
    pub action: &'static str,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Resource")]
    pub resource: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
}

/// Authorizer result shape the gateway consumes. `context` values must be
/// scalars, which is why claims travel as one stringified blob.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResult {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    pub context: Map<String, Value>,
}

/// Build a gateway policy. `resource` defaults to `"*"` at call sites: some
/// gateways mis-handle method-scoped ARNs on cached authorizer responses,
/// and the wildcard sidesteps that.
pub fn generate_policy(
    principal_id: &str,
    effect: Effect,
    resource: &str,
    context: Map<String, Value>,
) -> AuthorizerResult {
    AuthorizerResult {
        principal_id: principal_id.to_string(),
        policy_document: PolicyDocument {
            version: "2012-10-17",
            statement: vec![Statement {
                action: "execute-api:Invoke",
                effect,
                resource: resource.to_string(),
            }],
        },
        context,
    }
}

/// Outcome of one authorization attempt.
///
/// `Unauthorized` is a hard reject: no policy document at all, the gateway
/// answers 401 before the application layer is reached. `Denied` is the
/// authenticated-but-rejected path and still carries a well-formed policy so
/// the gateway can log and audit it.
#[derive(Debug)]
pub enum AuthOutcome {
    Authorized(AuthorizerResult),
    Denied(AuthorizerResult),
    Unauthorized,
}

/// Authorizer entry point: verify the event's bearer token and decide.
pub async fn authorize(event: &GatewayEvent, verifier: &TokenVerifier) -> AuthOutcome {
    let headers = event.lowercase_headers();

    match verifier.grant_api_access(&headers).await {
        Ok(verification) => {
            let mut context = Map::new();
            context.insert("claims".to_string(), Value::String(verification.claims));
            AuthOutcome::Authorized(generate_policy(PRINCIPAL_ID, Effect::Allow, "*", context))
        }
        Err(e) => {
            error!(error = %e, "authorization failed");
            match e.auth_kind() {
                Some(AuthErrorKind::InvalidToken) | Some(AuthErrorKind::ExpiredToken) => {
                    AuthOutcome::Unauthorized
                }
                _ => AuthOutcome::Denied(generate_policy(
                    PRINCIPAL_ID,
                    Effect::Deny,
                    "*",
                    Map::new(),
                )),
            }
        }
    }
}
