/*
 * Responsibility
 * - User-record shapes returned by the external directory
 * - Status-to-error mapping (only CONFIRMED yields a usable record)
 */
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AuthErrorKind};

/// Account status as reported by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Unconfirmed,
    Confirmed,
    Archived,
    Compromised,
    Unknown,
    ResetRequired,
    ForceChangePassword,
}

impl UserStatus {
    /// The classified error for a non-usable status, with a human-readable
    /// reason. `Confirmed` is the only status without one.
    pub fn as_error(&self) -> Option<AppError> {
        let (kind, message) = match self {
            Self::Confirmed => return None,
            Self::Unconfirmed => (
                AuthErrorKind::UnconfirmedUser,
                "User has been created but not confirmed",
            ),
            Self::Archived => (AuthErrorKind::ArchivedUser, "User is no longer active"),
            Self::Compromised => (
                AuthErrorKind::CompromisedUser,
                "User is disabled due to a potential security threat.",
            ),
            Self::Unknown => (AuthErrorKind::UnknownUser, "User status is unknown"),
            Self::ResetRequired => (
                AuthErrorKind::ResetRequiredUser,
                "User is confirmed, but the user must request a code and reset his or her password before he or she can sign in",
            ),
            Self::ForceChangePassword => (
                AuthErrorKind::ForceChangePassword,
                "The user is confirmed and the user can sign in using a temporary password, but on first sign-in, the user must change his or her password to a new value before doing anything else",
            ),
        };

        Some(AppError::auth(kind, message))
    }
}

/// Attribute pair as the directory reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAttribute {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Raw directory entity (consumed, not owned by this crate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub username: String,
    pub attributes: Vec<UserAttribute>,
    pub status: UserStatus,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parsed application-facing user record. `id` is the `sub` attribute.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub attributes: HashMap<String, String>,
    pub status: UserStatus,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Flatten the attribute list and promote `sub` to the record id.
    /// Status is carried as-is; status enforcement is the role layer's job.
    pub fn parse(user: DirectoryUser) -> Result<Self, AppError> {
        let attributes: HashMap<String, String> = user
            .attributes
            .into_iter()
            .map(|attribute| (attribute.name, attribute.value))
            .collect();

        let id = attributes
            .get("sub")
            .cloned()
            .ok_or_else(|| AppError::Attribute {
                message: format!("user record '{}' has no sub attribute", user.username),
            })?;

        Ok(Self {
            id,
            username: user.username,
            attributes,
            status: user.status,
            enabled: user.enabled,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}
