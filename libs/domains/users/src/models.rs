use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Raw JSON body of a create/update request.
///
/// Kept as the client sent it so validation can check key presence, value
/// types and whitespace before anything is coerced into a typed DTO.
pub type UserPayload = serde_json::Map<String, serde_json::Value>;

/// User entity - represents a user stored in MongoDB.
///
/// Not part of the OpenAPI surface; clients only ever see [`UserView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    /// Plain password string (kept out of every API response)
    pub password: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Public representation of a user.
///
/// Exactly two fields; the password never leaves the store layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

/// DTO for creating a new user, extracted from an already-validated payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub name: String,
    pub password: String,
}

impl CreateUser {
    /// Pull the writable fields out of a validated payload.
    ///
    /// Returns `None` if either required field is absent or not a string,
    /// which cannot happen for a payload that passed create validation.
    pub fn from_payload(payload: &UserPayload) -> Option<Self> {
        Some(Self {
            name: payload.get("name")?.as_str()?.to_owned(),
            password: payload.get("password")?.as_str()?.to_owned(),
        })
    }
}

/// DTO for updating an existing user; only present fields are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UpdateUser {
    /// Pull the writable subset out of a validated payload, leaving every
    /// other field of the stored record untouched.
    pub fn from_payload(payload: &UserPayload) -> Self {
        Self {
            name: payload
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_owned),
            password: payload
                .get("password")
                .and_then(|v| v.as_str())
                .map(str::to_owned),
        }
    }

    /// True when no writable field is present
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password.is_none()
    }
}

/// Query filters for listing users
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct UserFilter {
    /// Filter by exact name
    pub name: Option<String>,
}

impl User {
    /// Create a new user from a CreateUser DTO
    pub fn new(input: CreateUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            password: input.password,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> UserPayload {
        value.as_object().expect("payload must be an object").clone()
    }

    #[test]
    fn test_view_strips_password() {
        let user = User::new(CreateUser {
            name: "Alice123".to_string(),
            password: "longenoughpassword".to_string(),
        });
        let id = user.id;

        let view = UserView::from(user);
        assert_eq!(view.id, id);
        assert_eq!(view.name, "Alice123");

        let json = serde_json::to_value(&view).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(json.get("password").is_none());
        assert!(!json["id"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_create_user_from_payload() {
        let input = CreateUser::from_payload(&payload(json!({
            "name": "Alice123",
            "password": "longenoughpassword",
            "id": "ignored"
        })))
        .unwrap();

        assert_eq!(input.name, "Alice123");
        assert_eq!(input.password, "longenoughpassword");
    }

    #[test]
    fn test_create_user_from_payload_missing_field() {
        assert!(CreateUser::from_payload(&payload(json!({ "name": "Alice123" }))).is_none());
    }

    #[test]
    fn test_update_user_from_payload_subset() {
        let changes = UpdateUser::from_payload(&payload(json!({
            "id": "abc",
            "name": "Bobby"
        })));

        assert_eq!(changes.name.as_deref(), Some("Bobby"));
        assert!(changes.password.is_none());
        assert!(!changes.is_empty());

        let empty = UpdateUser::from_payload(&payload(json!({ "id": "abc" })));
        assert!(empty.is_empty());
    }
}
