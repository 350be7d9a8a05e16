/*
 * Responsibility
 * - UserDirectory trait: the external user-store surface this crate consumes
 * - Directory-layer errors, kept separate from AppError so callers decide
 *   how each failure maps at the response boundary
 */
use async_trait::async_trait;
use thiserror::Error;

use crate::services::directory::user::DirectoryUser;

/// Upstream directories return at most this many records per list call.
pub const DIRECTORY_PAGE_SIZE: usize = 60;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user '{username}' not found in directory")]
    UserNotFound { username: String },

    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Attributes for a user being created.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub attributes: Vec<(String, String)>,
    pub temporary_password: String,
    pub delivery_mediums: Vec<DeliveryMedium>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMedium {
    Email,
    Sms,
}

/// One page of a user listing. `pagination_token` from page N is required to
/// request page N+1, which makes listing strictly sequential.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<DirectoryUser>,
    pub pagination_token: Option<String>,
}

/// The external user store, keyed by pool id. Injected everywhere so tests
/// can run against an in-memory double.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, pool_id: &str, username: &str)
    -> Result<DirectoryUser, DirectoryError>;

    async fn create_user(
        &self,
        pool_id: &str,
        new_user: NewUser,
    ) -> Result<DirectoryUser, DirectoryError>;

    /// Fetch one page of at most [`DIRECTORY_PAGE_SIZE`] users.
    async fn list_users(
        &self,
        pool_id: &str,
        pagination_token: Option<&str>,
    ) -> Result<UserPage, DirectoryError>;

    async fn delete_user(&self, pool_id: &str, username: &str) -> Result<(), DirectoryError>;
}
