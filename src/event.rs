/*
 * Responsibility
 * - Wire model of the gateway event delivered to each invocation
 * - Header case-normalization (everything downstream assumes lowercase keys)
 * - Query-string parsing (limit + pagination cursors)
 */
use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;

/// Proxy/authorizer event as delivered by the invoking gateway.
///
/// Only the fields this core reads are modeled; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayEvent {
    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default, rename = "queryStringParameters")]
    pub query_string_parameters: Option<HashMap<String, String>>,

    #[serde(default, rename = "requestContext")]
    pub request_context: RequestContext,

    /// Present on authorizer events only.
    #[serde(default, rename = "methodArn")]
    pub method_arn: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub stage: Option<String>,

    /// Context attached by the custom authorizer on authorized requests.
    #[serde(default)]
    pub authorizer: Option<AuthorizerContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizerContext {
    /// Stringified claims JSON, as attached by the authorizer.
    #[serde(default)]
    pub claims: Option<String>,
}

/// Parsed pagination parameters.
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub limit: u32,
    pub start_at: Option<Value>,
    pub last_key: Option<Value>,
}

impl GatewayEvent {
    /// Header names lowercased. Gateways forward client headers with
    /// whatever casing the client used; the rest of the core looks keys up
    /// in lowercase only.
    pub fn lowercase_headers(&self) -> HashMap<String, String> {
        self.headers
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.clone()))
            .collect()
    }

    /// Parse `limit` / `start_at` / `last_key` query parameters.
    ///
    /// Cursors arrive as JSON-encoded strings; a cursor that does not parse
    /// is a client error (QueryError), not something to pass downstream.
    pub fn parse_query_params(&self, default_limit: u32) -> Result<QueryParams, AppError> {
        let Some(params) = &self.query_string_parameters else {
            return Ok(QueryParams {
                limit: default_limit,
                start_at: None,
                last_key: None,
            });
        };

        let limit = params
            .get("limit")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(default_limit);

        let start_at = parse_cursor(params, "start_at")?;
        let last_key = parse_cursor(params, "last_key")?;

        Ok(QueryParams {
            limit,
            start_at,
            last_key,
        })
    }

    pub fn stage(&self) -> Option<&str> {
        self.request_context.stage.as_deref()
    }
}

fn parse_cursor(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<Value>, AppError> {
    match params.get(name) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw).map(Some).map_err(|_| AppError::Query {
            message: format!("'{name}' is not a valid JSON cursor"),
        }),
    }
}
