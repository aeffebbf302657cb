//! User Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserFilter, UserPayload};
use crate::repository::UserRepository;
use crate::validation::{self, Operation};

/// User service providing business logic operations
///
/// The service layer validates raw payloads, converts them into typed DTOs
/// and orchestrates repository operations. The repository is never touched
/// for a write when validation reported problems.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List users with optional filters
    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        self.repository.list(filter).await
    }

    /// Get a user by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Create a new user from a raw payload
    #[instrument(skip(self, payload))]
    pub async fn create_user(&self, payload: UserPayload) -> UserResult<User> {
        let problems = validation::validate(Operation::Create, &payload, self.repository.as_ref())
            .await
            .map_err(|e| e.into_write_failure("create"))?;
        if !problems.is_empty() {
            return Err(UserError::Validation(problems));
        }

        // Only {name, password} from the payload ever reaches the store
        let input = CreateUser::from_payload(&payload).ok_or_else(|| {
            UserError::Internal("validated create payload is missing required fields".to_string())
        })?;

        self.repository
            .create(input)
            .await
            .map_err(|e| e.into_write_failure("create"))
    }

    /// Apply the writable subset of a raw payload to an existing user
    #[instrument(skip(self, payload))]
    pub async fn update_user(&self, id: Uuid, payload: UserPayload) -> UserResult<()> {
        let problems = validation::validate(Operation::Update, &payload, self.repository.as_ref())
            .await
            .map_err(|e| e.into_write_failure("update"))?;
        if !problems.is_empty() {
            return Err(UserError::Validation(problems));
        }

        let changes = UpdateUser::from_payload(&payload);

        self.repository
            .update(id, changes)
            .await
            .map_err(|e| e.into_write_failure("update"))
    }

    /// Delete a user. Repeated deletes of the same id keep succeeding.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| e.into_write_failure("delete"))
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
