/*
 * Responsibility
 * - Bearer-token verification against the issuer's published keys
 * - Reclassification of library errors into the stable auth taxonomy
 * - Key resolution through the injected fetcher + cache collaborators
 */
use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::Validation;
use jsonwebtoken::errors::ErrorKind;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::services::auth::jwks::{JwksFetcher, KeySet, KeySetCache};

pub const ISSUER_HEADER: &str = "x-cognito-issuer";
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Token header segment; only the key id matters here, signature/claims
/// checks are the library's job.
#[derive(Debug, Deserialize)]
struct TokenHeader {
    #[serde(default)]
    kid: Option<String>,
}

/// Verified identity, as attached to the gateway's authorizer context.
/// Claims are carried in stringified form because the gateway context only
/// transports scalar values.
#[derive(Debug, Clone)]
pub struct VerificationContext {
    pub claims: String,
}

/// Verifies bearer tokens. Both collaborators are injected: the fetcher so
/// tests never touch a network, the cache so warm hosts can skip refetching.
#[derive(Clone)]
pub struct TokenVerifier {
    fetcher: Arc<dyn JwksFetcher>,
    cache: Arc<dyn KeySetCache>,
}

impl TokenVerifier {
    pub fn new(fetcher: Arc<dyn JwksFetcher>, cache: Arc<dyn KeySetCache>) -> Self {
        Self { fetcher, cache }
    }

    /// Verify the bearer token carried in `headers` (keys already
    /// lowercased) and return the verified claims.
    ///
    /// Failure taxonomy:
    /// - missing/malformed authorization header, <2 token segments, unknown
    ///   kid, signature/claims mismatch -> `auth/invalid_token`
    /// - expired token -> `auth/expired_token`
    /// - undecodable token header, unreachable/malformed JWKS endpoint ->
    ///   generic errors, propagated unclassified
    pub async fn grant_api_access(
        &self,
        headers: &HashMap<String, String>,
    ) -> Result<VerificationContext, AppError> {
        let issuer = headers
            .get(ISSUER_HEADER)
            .ok_or_else(|| AppError::bad_request("missing x-cognito-issuer header"))?;

        let token = headers
            .get(AUTHORIZATION_HEADER)
            .and_then(|value| value.split_whitespace().nth(1))
            .ok_or_else(|| AppError::invalid_token("No bearer token in authorization header"))?;

        let sections: Vec<&str> = token.split('.').collect();
        if sections.len() < 2 {
            return Err(AppError::invalid_token("Requested token is incomplete"));
        }

        let header = decode_token_header(sections[0])?;
        let kid = header.kid.unwrap_or_default();

        let keys = self.resolve_keys(issuer).await?;
        let key = keys
            .get(&kid)
            .ok_or_else(|| AppError::invalid_token("Claims made for unknown kid"))?;

        let mut validation = Validation::new(key.algorithm);
        // The original authorizer checks signature + time claims only;
        // audience varies per client app.
        validation.validate_aud = false;
        validation.validate_nbf = true;

        let data = jsonwebtoken::decode::<Value>(token, &key.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::expired_token(format!("Token has expired - {e}"))
                }
                _ => AppError::invalid_token(format!("Token verification failed - {e}")),
            })?;

        debug!("token verified");
        let claims = serde_json::to_string(&data.claims)
            .map_err(|e| AppError::internal(format!("failed to serialize claims: {e}")))?;

        Ok(VerificationContext { claims })
    }

    /// Key set for `issuer`, read-through the cache collaborator.
    async fn resolve_keys(&self, issuer: &str) -> Result<KeySet, AppError> {
        if let Some(keys) = self.cache.get(issuer).await {
            return Ok(keys);
        }

        let jwks = self.fetcher.fetch(issuer).await.map_err(|e| {
            warn!(error = %e, "jwks resolution failed");
            AppError::from(e)
        })?;

        let keys = KeySet::from_jwks(&jwks)?;
        self.cache.put(issuer, keys.clone()).await;
        Ok(keys)
    }
}

/// Base64url-decode + JSON-parse the first token segment. Failures here are
/// generic (not auth-classified): a token that passed the segment check but
/// carries garbage is unexpected enough to surface loudly.
fn decode_token_header(segment: &str) -> Result<TokenHeader, AppError> {
    let raw = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AppError::internal(format!("failed to decode token header: {e}")))?;

    serde_json::from_slice(&raw)
        .map_err(|e| AppError::internal(format!("failed to parse token header: {e}")))
}
