//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, doc, to_bson},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserFilter};
use crate::repository::UserRepository;

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    /// Create a new MongoUserRepository
    ///
    /// # Arguments
    /// * `db` - MongoDB database instance
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let db = client.database("mydb");
    /// let repo = MongoUserRepository::new(db);
    /// ```
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<User>("users");
        Self { collection }
    }

    /// Create a new MongoUserRepository with a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<User>(collection_name);
        Self { collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// Create the unique index on `name`.
    ///
    /// The index is the authoritative uniqueness guarantee; the validator's
    /// pre-write lookup only exists to give callers a readable error before
    /// the write is attempted.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;
        Ok(())
    }

    /// Build a MongoDB filter document from UserFilter
    fn build_filter(filter: &UserFilter) -> mongodb::bson::Document {
        let mut doc = doc! {};

        if let Some(ref name) = filter.name {
            doc.insert("name", name.as_str());
        }

        doc
    }

    /// E11000: the unique index on `name` rejected the write
    fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
        use mongodb::error::{ErrorKind, WriteFailure};

        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
            ErrorKind::Command(command_error) => command_error.code == 11000,
            _ => false,
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, input), fields(user_name = %input.name))]
    async fn create(&self, input: CreateUser) -> UserResult<User> {
        let user = User::new(input);

        self.collection.insert_one(&user).await.map_err(|e| {
            if Self::is_duplicate_key(&e) {
                UserError::DuplicateName(user.name.clone())
            } else {
                UserError::from(e)
            }
        })?;

        tracing::info!(user_id = %user.id, "User created successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let user = self.collection.find_one(filter).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        use futures_util::TryStreamExt;

        let mongo_filter = Self::build_filter(&filter);

        let options = mongodb::options::FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self
            .collection
            .find(mongo_filter)
            .with_options(options)
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;

        Ok(users)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: UpdateUser) -> UserResult<()> {
        let new_name = changes.name.clone();

        let mut set = doc! { "updated_at": to_bson(&Utc::now()).unwrap_or(Bson::Null) };
        if let Some(name) = changes.name {
            set.insert("name", name);
        }
        if let Some(password) = changes.password {
            set.insert("password", password);
        }

        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let result = self
            .collection
            .update_one(filter, doc! { "$set": set })
            .await
            .map_err(|e| {
                if Self::is_duplicate_key(&e) {
                    UserError::DuplicateName(new_name.unwrap_or_default())
                } else {
                    UserError::from(e)
                }
            })?;

        tracing::info!(user_id = %id, matched = result.matched_count, "User update applied");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let result = self.collection.delete_one(filter).await?;

        // Deleting an absent user is still a success
        tracing::info!(user_id = %id, deleted = result.deleted_count, "User delete applied");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn name_exists(&self, name: &str) -> UserResult<bool> {
        let filter = doc! { "name": name };
        let count = self.collection.count_documents(filter).await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let filter = UserFilter::default();
        let doc = MongoUserRepository::build_filter(&filter);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_name() {
        let filter = UserFilter {
            name: Some("Bob".to_string()),
        };
        let doc = MongoUserRepository::build_filter(&filter);
        assert_eq!(doc.get_str("name").unwrap(), "Bob");
    }
}
