/*
 * Responsibility
 * - Role membership checks against role-specific user pools
 * - Directory user lifecycle helpers (create / list-all / delete)
 * - Pagination of list-users with an explicit iteration bound
 */
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RolePools;
use crate::error::AppError;
use crate::event::GatewayEvent;
use crate::services::auth::claims;
use crate::services::directory::client::{
    DIRECTORY_PAGE_SIZE, DeliveryMedium, NewUser, UserDirectory, UserPage,
};
use crate::services::directory::user::UserRecord;
use crate::util;

const TEMPORARY_PASSWORD_LENGTH: usize = 8;

/// Request to provision a directory user.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub phone_number: Option<String>,
}

/// Role checks backed by the injected directory and per-role pool ids.
#[derive(Clone)]
pub struct RoleChecker {
    directory: Arc<dyn UserDirectory>,
    pools: RolePools,
    max_list_pages: u32,
}

impl RoleChecker {
    pub fn new(directory: Arc<dyn UserDirectory>, pools: RolePools, max_list_pages: u32) -> Self {
        Self {
            directory,
            pools,
            max_list_pages,
        }
    }

    /// Look the user up in `pool_id` and require a CONFIRMED status.
    ///
    /// Every other status becomes its own classified error; a directory
    /// not-found propagates as-is.
    pub async fn confirmed_user(
        &self,
        pool_id: &str,
        user_id: &str,
    ) -> Result<UserRecord, AppError> {
        let user = self.directory.get_user(pool_id, user_id).await?;

        if let Some(error) = user.status.as_error() {
            warn!(user_id, status = ?user.status, "user is not usable");
            return Err(error);
        }

        UserRecord::parse(user)
    }

    pub async fn is_dispatcher(&self, user_id: &str) -> Result<UserRecord, AppError> {
        self.confirmed_user(&self.pools.dispatcher, user_id).await
    }

    pub async fn is_admin(&self, user_id: &str) -> Result<UserRecord, AppError> {
        self.confirmed_user(&self.pools.admin, user_id).await
    }

    pub async fn is_responder(&self, user_id: &str) -> Result<UserRecord, AppError> {
        self.confirmed_user(&self.pools.responder, user_id).await
    }

    pub async fn is_ambulance_provider(&self, user_id: &str) -> Result<UserRecord, AppError> {
        self.confirmed_user(&self.pools.ambulance_provider, user_id)
            .await
    }

    pub async fn is_hospital_admin(&self, user_id: &str) -> Result<UserRecord, AppError> {
        self.confirmed_user(&self.pools.hospital_admin, user_id).await
    }

    pub async fn is_registered_user(&self, user_id: &str) -> Result<UserRecord, AppError> {
        self.confirmed_user(&self.pools.user, user_id).await
    }

    /// Event-level check: the authenticated caller must be a dispatcher.
    pub async fn has_dispatcher_access(&self, event: &GatewayEvent) -> Result<UserRecord, AppError> {
        let user_id = claims::user_id(event)?;
        self.is_dispatcher(&user_id).await
    }

    /// Event-level check: the authenticated caller must be an ambulance
    /// provider.
    pub async fn has_ambulance_provider_access(
        &self,
        event: &GatewayEvent,
    ) -> Result<UserRecord, AppError> {
        let user_id = claims::user_id(event)?;
        self.is_ambulance_provider(&user_id).await
    }

    /// Event-level check: the authenticated caller must be a responder.
    pub async fn has_responder_access(&self, event: &GatewayEvent) -> Result<UserRecord, AppError> {
        let user_id = claims::user_id(event)?;
        self.is_responder(&user_id).await
    }

    /// Provision a user in `pool_id` with verified email (and phone when
    /// given), delivery over email/SMS, and a generated temporary password.
    pub async fn create_user(
        &self,
        pool_id: &str,
        request: CreateUserRequest,
    ) -> Result<UserRecord, AppError> {
        let mut attributes = vec![
            ("email".to_string(), request.email.clone()),
            ("email_verified".to_string(), "True".to_string()),
        ];
        if let Some(phone_number) = &request.phone_number {
            attributes.push(("phone_number".to_string(), phone_number.clone()));
            attributes.push(("phone_number_verified".to_string(), "True".to_string()));
        }

        let user = self
            .directory
            .create_user(
                pool_id,
                NewUser {
                    username: request.email,
                    attributes,
                    temporary_password: util::generate_password(TEMPORARY_PASSWORD_LENGTH),
                    delivery_mediums: vec![DeliveryMedium::Email, DeliveryMedium::Sms],
                },
            )
            .await?;

        UserRecord::parse(user)
    }

    /// Fetch every user in `pool_id`.
    ///
    /// Strictly sequential: each page's continuation token is required for
    /// the next request. Stops on a short page or a missing token, and is
    /// bounded by `max_list_pages` in case the upstream keeps returning
    /// full pages with fresh tokens.
    pub async fn list_all_users(&self, pool_id: &str) -> Result<Vec<UserRecord>, AppError> {
        let mut users = Vec::new();
        let mut pagination_token: Option<String> = None;

        for page_number in 0..self.max_list_pages {
            let UserPage {
                users: page,
                pagination_token: next_token,
            } = self
                .directory
                .list_users(pool_id, pagination_token.as_deref())
                .await?;

            let full_page = page.len() == DIRECTORY_PAGE_SIZE;
            users.extend(page);

            if !full_page || next_token.is_none() {
                break;
            }
            if page_number + 1 == self.max_list_pages {
                warn!(pool_id, pages = self.max_list_pages, "list-users page bound reached");
            }
            pagination_token = next_token;
        }

        debug!(pool_id, count = users.len(), "listed directory users");
        users.into_iter().map(UserRecord::parse).collect()
    }

    pub async fn delete_user(&self, pool_id: &str, user_id: &str) -> Result<(), AppError> {
        self.directory.delete_user(pool_id, user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthErrorKind;
    use crate::services::directory::client::DirectoryError;
    use crate::services::directory::user::{DirectoryUser, UserAttribute, UserStatus};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn directory_user(sub: &str, status: UserStatus) -> DirectoryUser {
        DirectoryUser {
            username: format!("{sub}@example.com"),
            attributes: vec![UserAttribute {
                name: "sub".to_string(),
                value: sub.to_string(),
            }],
            status,
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// In-memory directory double: one pool of users, paginated like the
    /// real thing.
    #[derive(Default)]
    struct MemoryDirectory {
        users: Mutex<HashMap<String, DirectoryUser>>,
        list_calls: AtomicUsize,
    }

    impl MemoryDirectory {
        fn with_users(users: Vec<DirectoryUser>) -> Self {
            Self {
                users: Mutex::new(
                    users
                        .into_iter()
                        .map(|u| (u.username.clone(), u))
                        .collect(),
                ),
                list_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl UserDirectory for MemoryDirectory {
        async fn get_user(
            &self,
            _pool_id: &str,
            username: &str,
        ) -> Result<DirectoryUser, DirectoryError> {
            self.users
                .lock()
                .unwrap()
                .get(username)
                .cloned()
                .ok_or_else(|| DirectoryError::UserNotFound {
                    username: username.to_string(),
                })
        }

        async fn create_user(
            &self,
            _pool_id: &str,
            new_user: NewUser,
        ) -> Result<DirectoryUser, DirectoryError> {
            let mut attributes: Vec<UserAttribute> = new_user
                .attributes
                .into_iter()
                .map(|(name, value)| UserAttribute { name, value })
                .collect();
            attributes.push(UserAttribute {
                name: "sub".to_string(),
                value: format!("sub-{}", new_user.username),
            });

            let user = DirectoryUser {
                username: new_user.username.clone(),
                attributes,
                status: UserStatus::ForceChangePassword,
                enabled: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.users
                .lock()
                .unwrap()
                .insert(new_user.username, user.clone());
            Ok(user)
        }

        async fn list_users(
            &self,
            _pool_id: &str,
            pagination_token: Option<&str>,
        ) -> Result<UserPage, DirectoryError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);

            let users = self.users.lock().unwrap();
            let mut sorted: Vec<&DirectoryUser> = users.values().collect();
            sorted.sort_by(|a, b| a.username.cmp(&b.username));

            let offset: usize = pagination_token
                .map(|t| t.parse().unwrap_or(0))
                .unwrap_or(0);
            let page: Vec<DirectoryUser> = sorted
                .into_iter()
                .skip(offset)
                .take(DIRECTORY_PAGE_SIZE)
                .cloned()
                .collect();

            let next = offset + page.len();
            let pagination_token = (next < users.len()).then(|| next.to_string());
            Ok(UserPage {
                users: page,
                pagination_token,
            })
        }

        async fn delete_user(
            &self,
            _pool_id: &str,
            username: &str,
        ) -> Result<(), DirectoryError> {
            self.users
                .lock()
                .unwrap()
                .remove(username)
                .map(|_| ())
                .ok_or_else(|| DirectoryError::UserNotFound {
                    username: username.to_string(),
                })
        }
    }

    fn pools() -> RolePools {
        RolePools {
            dispatcher: "dispatcher-pool".to_string(),
            admin: "admin-pool".to_string(),
            responder: "responder-pool".to_string(),
            ambulance_provider: "ambulance-pool".to_string(),
            hospital_admin: "hospital-pool".to_string(),
            user: "user-pool".to_string(),
        }
    }

    fn checker(directory: MemoryDirectory) -> RoleChecker {
        RoleChecker::new(Arc::new(directory), pools(), 50)
    }

    #[tokio::test]
    async fn confirmed_user_is_returned_parsed() {
        let directory = MemoryDirectory::with_users(vec![directory_user(
            "user-123",
            UserStatus::Confirmed,
        )]);

        let record = checker(directory)
            .confirmed_user("user-pool", "user-123@example.com")
            .await
            .unwrap();
        assert_eq!(record.id, "user-123");
    }

    #[tokio::test]
    async fn archived_user_maps_to_archived_error() {
        let directory = MemoryDirectory::with_users(vec![directory_user(
            "user-123",
            UserStatus::Archived,
        )]);

        let err = checker(directory)
            .confirmed_user("user-pool", "user-123@example.com")
            .await
            .unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::ArchivedUser));
    }

    #[tokio::test]
    async fn unknown_user_propagates_not_found() {
        let err = checker(MemoryDirectory::default())
            .confirmed_user("user-pool", "ghost@example.com")
            .await
            .unwrap_err();
        assert_eq!(err.name(), "UserNotFoundException");
    }

    #[tokio::test]
    async fn create_user_sets_verified_email_and_phone_attributes() {
        let record = checker(MemoryDirectory::default())
            .create_user(
                "user-pool",
                CreateUserRequest {
                    email: "ada@example.com".to_string(),
                    phone_number: Some("+15550100".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(record.username, "ada@example.com");
        assert_eq!(record.attributes["email_verified"], "True");
        assert_eq!(record.attributes["phone_number"], "+15550100");
        assert_eq!(record.attributes["phone_number_verified"], "True");
    }

    #[tokio::test]
    async fn list_all_users_aggregates_full_pages_and_stops_on_short_page() {
        // Two full pages of 60 and a short third page
        let users: Vec<DirectoryUser> = (0..150)
            .map(|i| directory_user(&format!("user-{i:03}"), UserStatus::Confirmed))
            .collect();
        let directory = MemoryDirectory::with_users(users);

        let checker = RoleChecker::new(Arc::new(directory), pools(), 50);
        let records = checker.list_all_users("user-pool").await.unwrap();

        assert_eq!(records.len(), 150);
        let ids: std::collections::HashSet<&str> =
            records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 150);
    }

    #[tokio::test]
    async fn list_all_users_stops_after_exactly_short_page() {
        let users: Vec<DirectoryUser> = (0..70)
            .map(|i| directory_user(&format!("user-{i:03}"), UserStatus::Confirmed))
            .collect();
        let directory = MemoryDirectory::with_users(users);
        let directory = Arc::new(directory);

        let checker = RoleChecker::new(directory.clone(), pools(), 50);
        let records = checker.list_all_users("user-pool").await.unwrap();

        assert_eq!(records.len(), 70);
        // Page of 60, then the short page of 10; no third call
        assert_eq!(directory.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn list_all_users_respects_the_page_bound() {
        /// Upstream misbehaving: always a full page with a fresh token.
        struct EndlessDirectory;

        #[async_trait]
        impl UserDirectory for EndlessDirectory {
            async fn get_user(
                &self,
                _pool_id: &str,
                username: &str,
            ) -> Result<DirectoryUser, DirectoryError> {
                Err(DirectoryError::UserNotFound {
                    username: username.to_string(),
                })
            }

            async fn create_user(
                &self,
                _pool_id: &str,
                _new_user: NewUser,
            ) -> Result<DirectoryUser, DirectoryError> {
                Err(DirectoryError::Backend("unsupported".to_string()))
            }

            async fn list_users(
                &self,
                _pool_id: &str,
                pagination_token: Option<&str>,
            ) -> Result<UserPage, DirectoryError> {
                let offset: usize = pagination_token
                    .map(|t| t.parse().unwrap_or(0))
                    .unwrap_or(0);
                let users = (0..DIRECTORY_PAGE_SIZE)
                    .map(|i| directory_user(&format!("user-{}", offset + i), UserStatus::Confirmed))
                    .collect();
                Ok(UserPage {
                    users,
                    pagination_token: Some((offset + DIRECTORY_PAGE_SIZE).to_string()),
                })
            }

            async fn delete_user(
                &self,
                _pool_id: &str,
                _username: &str,
            ) -> Result<(), DirectoryError> {
                Ok(())
            }
        }

        let checker = RoleChecker::new(Arc::new(EndlessDirectory), pools(), 3);
        let records = checker.list_all_users("user-pool").await.unwrap();
        assert_eq!(records.len(), 3 * DIRECTORY_PAGE_SIZE);
    }

    #[tokio::test]
    async fn delete_user_removes_the_record() {
        let directory = Arc::new(MemoryDirectory::with_users(vec![directory_user(
            "user-123",
            UserStatus::Confirmed,
        )]));

        let checker = RoleChecker::new(directory.clone(), pools(), 50);
        checker
            .delete_user("user-pool", "user-123@example.com")
            .await
            .unwrap();

        let err = checker
            .confirmed_user("user-pool", "user-123@example.com")
            .await
            .unwrap_err();
        assert_eq!(err.name(), "UserNotFoundException");
    }
}
