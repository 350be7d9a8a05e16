pub mod client;
pub mod roles;
pub mod user;

pub use client::{DIRECTORY_PAGE_SIZE, DirectoryError, UserDirectory, UserPage};
pub use roles::{CreateUserRequest, RoleChecker};
pub use user::{DirectoryUser, UserRecord, UserStatus};
