use async_trait::async_trait;
use uuid::Uuid;

use crate::error::UserResult;
use crate::models::{CreateUser, UpdateUser, User, UserFilter};

/// Repository trait for User persistence
///
/// This trait defines the data access interface for users.
/// Implementations can use different storage backends (MongoDB, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, input: CreateUser) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// List users with optional filters
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Apply the given subset of fields to an existing user.
    ///
    /// Succeeds whether or not a record matched the id.
    async fn update(&self, id: Uuid, changes: UpdateUser) -> UserResult<()>;

    /// Delete a user by ID. Idempotent: deleting an absent user succeeds.
    async fn delete(&self, id: Uuid) -> UserResult<()>;

    /// Check if a user name is already taken
    async fn name_exists(&self, name: &str) -> UserResult<bool>;
}
