/*
 * Responsibility
 * - App-wide AppError definition (closed enum, replaces ad hoc error classes)
 * - Stable name()/code() accessors for the response envelope
 * - Conversions from collaborator errors (JWKS fetch, user directory)
 */
use thiserror::Error;

use crate::services::auth::jwks::JwksError;
use crate::services::directory::client::DirectoryError;

/// Classification of authentication/authorization failures.
///
/// Codes are rendered as `auth/<kind>` so callers never depend on the
/// verification library's own error names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidToken,
    ExpiredToken,
    AuthorizerError,
    NotAllowed,
    UnconfirmedUser,
    ArchivedUser,
    CompromisedUser,
    UnknownUser,
    ResetRequiredUser,
    ForceChangePassword,
}

impl AuthErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "auth/invalid_token",
            Self::ExpiredToken => "auth/expired_token",
            Self::AuthorizerError => "auth/authorizer_error",
            Self::NotAllowed => "auth/not_allowed",
            Self::UnconfirmedUser => "auth/unconfirmed_user",
            Self::ArchivedUser => "auth/archived_user",
            Self::CompromisedUser => "auth/compromised_user",
            Self::UnknownUser => "auth/unknown_user",
            Self::ResetRequiredUser => "auth/reset_required_user",
            Self::ForceChangePassword => "auth/force_change_password",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Auth {
        kind: AuthErrorKind,
        message: String,
    },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Query { message: String },

    #[error("Please specify the following parameters in body: {}", params.join(", "))]
    ParamMissing { params: Vec<String> },

    #[error("{message}")]
    Field { message: String },

    #[error("{message}")]
    Attribute { message: String },

    #[error("{message}")]
    NotSupported { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Validation { message: String },

    /// Conditional writes that did not match; the stored message is replaced
    /// with a user-facing one by the response layer.
    #[error("{message}")]
    ConditionalCheckFailed { message: String },

    /// Business-rule violations carrying their own error name (e.g.
    /// "SubscriptionError"). Mapped to 400 like BadRequest.
    #[error("{message}")]
    Rule {
        name: &'static str,
        message: String,
    },

    #[error(transparent)]
    Jwks(#[from] JwksError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Unclassified failures (malformed JSON, unexpected states). The
    /// response layer defaults these to a 500-equivalent.
    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn auth(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self::Auth {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::auth(AuthErrorKind::InvalidToken, message)
    }

    pub fn expired_token(message: impl Into<String>) -> Self {
        Self::auth(AuthErrorKind::ExpiredToken, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The classified auth kind, if this is an auth failure.
    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            Self::Auth { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Stable error name surfaced in the response envelope.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "AuthError",
            Self::NotFound { .. } => "NotFoundError",
            Self::Query { .. } => "QueryError",
            Self::ParamMissing { .. } => "ParamMissingError",
            Self::Field { .. } => "FieldError",
            Self::Attribute { .. } => "AttributeError",
            Self::NotSupported { .. } => "NotSupportedError",
            Self::BadRequest { .. } => "BadRequestError",
            Self::Validation { .. } => "ValidationError",
            Self::ConditionalCheckFailed { .. } => "ConditionalCheckFailedException",
            Self::Rule { name, .. } => name,
            Self::Jwks(_) => "JwksError",
            Self::Directory(DirectoryError::UserNotFound { .. }) => "UserNotFoundException",
            Self::Directory(_) => "DirectoryError",
            Self::Internal { .. } => "InternalError",
        }
    }

    /// Stable error code surfaced in the response envelope, if one exists.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Auth { kind, .. } => Some(kind.code()),
            _ => None,
        }
    }
}
