/*
 * Responsibility
 * - Uniform response envelope ({status, data|message|error}) for every handler
 * - Deterministic error-to-status mapping (first match wins)
 * - Fixed permissive CORS header set on every response
 */
use std::collections::BTreeMap;

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

pub const CORS_HEADERS: &[(&str, &str)] = &[
    (
        "Access-Control-Allow-Headers",
        "Origin, X-Requested-With, Content-Type, Authorization, Accept, x-www-form-urlencoded, X-Cognito-Issuer, X-API-Key",
    ),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "OPTIONS,POST,GET,PUT,DELETE"),
];

const CONDITIONAL_CHECK_MESSAGE: &str =
    "Condition request failed; This resource may not exist in the table";

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub name: String,
    pub message: String,
    pub code: String,
}

/// Serialized response body. `data` and `error` are mutually exclusive:
/// the error path never carries `data`, the success path never carries
/// `error`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseBody {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Response handed back to the transport: status code, CORS headers and the
/// envelope body. Immutable once built.
#[derive(Debug)]
pub struct ApiResponse {
    pub status_code: StatusCode,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        CORS_HEADERS
    }

    /// Serialize into the gateway proxy-response shape.
    pub fn to_gateway(&self) -> Result<GatewayResponse, serde_json::Error> {
        Ok(GatewayResponse {
            status_code: self.status_code.as_u16(),
            headers: CORS_HEADERS.iter().copied().collect(),
            body: serde_json::to_string(&self.body)?,
        })
    }
}

/// Proxy-response wire shape; `headers` must serialize as a JSON object
/// (header name to value), not a list of pairs.
#[derive(Debug, Serialize)]
pub struct GatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<&'static str, &'static str>,
    pub body: String,
}

/// Inputs to [`make_response`]. Success populates `data`/`message`; failure
/// populates `error` (and optionally `code` to override the error's own).
#[derive(Debug, Default)]
pub struct ResponseParts {
    pub data: Option<Value>,
    pub message: Option<String>,
    pub error: Option<AppError>,
    pub code: Option<String>,
}

impl ResponseParts {
    pub fn success(data: Value, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn failure(error: AppError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Build the uniform envelope.
///
/// Error path: status code is picked by the first matching classification
/// rule; an unclassified error under a 200 default becomes a 500 with code
/// `internal-server-error`, any other caller-supplied status passes through.
/// Success path: always 200, whatever status the caller supplied.
pub fn make_response(parts: ResponseParts, status_code: StatusCode) -> ApiResponse {
    let ResponseParts {
        data,
        message,
        error,
        code,
    } = parts;

    match error {
        Some(error) => {
            let (status, fallback_code) = classify(&error, status_code);
            let message = match &error {
                AppError::ConditionalCheckFailed { .. } => CONDITIONAL_CHECK_MESSAGE.to_string(),
                other => other.to_string(),
            };

            let code = error
                .code()
                .map(str::to_string)
                .or(code)
                .or(fallback_code)
                .unwrap_or_else(|| "error".to_string());

            ApiResponse {
                status_code: status,
                body: ResponseBody {
                    status: "error",
                    data: None,
                    message: message.clone(),
                    error: Some(ErrorBody {
                        name: error.name().to_string(),
                        message,
                        code,
                    }),
                },
            }
        }
        None => ApiResponse {
            status_code: StatusCode::OK,
            body: ResponseBody {
                status: "success",
                data: Some(data.unwrap_or(Value::Null)),
                message: message.unwrap_or_default(),
                error: None,
            },
        },
    }
}

/// Ordered error-to-status mapping. Exactly one rule applies per error; the
/// second element is a code override for the internal-server default.
fn classify(error: &AppError, supplied: StatusCode) -> (StatusCode, Option<String>) {
    use crate::services::directory::client::DirectoryError;

    match error {
        AppError::ParamMissing { .. } | AppError::Field { .. } | AppError::Query { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, None)
        }
        AppError::NotFound { .. } | AppError::Directory(DirectoryError::UserNotFound { .. }) => {
            (StatusCode::NOT_FOUND, None)
        }
        AppError::BadRequest { .. }
        | AppError::ConditionalCheckFailed { .. }
        | AppError::Rule { .. } => (StatusCode::BAD_REQUEST, None),
        AppError::NotSupported { .. } => (StatusCode::NOT_ACCEPTABLE, None),
        AppError::Validation { .. } => (StatusCode::BAD_REQUEST, None),
        _ if supplied == StatusCode::OK => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Some("internal-server-error".to_string()),
        ),
        _ => (supplied, None),
    }
}
