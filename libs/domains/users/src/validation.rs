//! Field-by-field validation of create/update payloads.
//!
//! Works on the raw JSON object rather than a typed DTO so that missing
//! keys, wrong value types and un-trimmed strings each produce their own
//! problem instead of a blanket deserialization error. All problems are
//! collected into one list; an empty list means the payload is acceptable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::UserResult;
use crate::models::UserPayload;
use crate::repository::UserRepository;

/// Minimum trimmed length of `name`
pub const NAME_MIN_LEN: usize = 4;
/// Minimum trimmed length of `password`
pub const PASSWORD_MIN_LEN: usize = 10;
/// Maximum trimmed length of `password`. Hashing schemes with fixed input
/// limits (e.g. bcrypt) truncate past 72 characters; reject instead of
/// storing bytes that would never be checked.
pub const PASSWORD_MAX_LEN: usize = 72;

const REQUIRED_FIELDS: [&str; 2] = ["name", "password"];
const STRING_FIELDS: [&str; 2] = ["name", "password"];
const TRIMMED_FIELDS: [&str; 2] = ["name", "password"];

/// The operation a payload is being validated for.
///
/// Required-field enforcement applies to `Create` only; an update may carry
/// any subset of the writable fields. The caller always states the operation
/// explicitly - it is never inferred from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// One validation failure.
///
/// `field` names the offending payload key, or is `None` for problems that
/// concern the record as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationProblem {
    pub message: String,
    pub field: Option<String>,
}

impl ValidationProblem {
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

/// Returns the payload value for `field` only when it is a JSON string.
fn string_field<'a>(payload: &'a UserPayload, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(Value::as_str)
}

/// Validate a payload for the given operation.
///
/// Every check appends its problems to the returned list; the list is empty
/// when the payload is acceptable. The uniqueness check reads the store
/// through `repository` and is awaited before the result is produced - a
/// store failure during that check surfaces as `Err`, it is never swallowed
/// into the problem list.
///
/// # Errors
///
/// Returns `Err` only when the uniqueness lookup itself fails at the store.
pub async fn validate<R>(
    op: Operation,
    payload: &UserPayload,
    repository: &R,
) -> UserResult<Vec<ValidationProblem>>
where
    R: UserRepository + ?Sized,
{
    let mut problems = Vec::new();

    // Required fields apply to create only; an update may send any subset
    if op == Operation::Create {
        for field in REQUIRED_FIELDS {
            if !payload.contains_key(field) {
                problems.push(ValidationProblem::for_field(
                    field,
                    format!("The field {} is missing from the request.", field),
                ));
            }
        }
    }

    for field in STRING_FIELDS {
        if let Some(value) = payload.get(field) {
            if !value.is_string() {
                problems.push(ValidationProblem::for_field(
                    field,
                    format!("The field {} is not a string.", field),
                ));
            }
        }
    }

    for field in TRIMMED_FIELDS {
        if let Some(value) = string_field(payload, field) {
            if value.trim() != value {
                problems.push(ValidationProblem::for_field(
                    field,
                    format!("The field {} cannot start or end with whitespace.", field),
                ));
            }
        }
    }

    if let Some(name) = string_field(payload, "name") {
        if name.trim().chars().count() < NAME_MIN_LEN {
            problems.push(ValidationProblem::for_field(
                "name",
                format!("The field name must be at least {} characters long.", NAME_MIN_LEN),
            ));
        }
    }

    if let Some(password) = string_field(payload, "password") {
        let len = password.trim().chars().count();
        if len < PASSWORD_MIN_LEN {
            problems.push(ValidationProblem::for_field(
                "password",
                format!(
                    "The field password must be at least {} characters long.",
                    PASSWORD_MIN_LEN
                ),
            ));
        }
        if len > PASSWORD_MAX_LEN {
            problems.push(ValidationProblem::for_field(
                "password",
                format!(
                    "The field password must be at most {} characters long.",
                    PASSWORD_MAX_LEN
                ),
            ));
        }
    }

    // Fast-path uniqueness check; the unique index on the collection is the
    // authoritative guard against concurrent creates
    if let Some(name) = string_field(payload, "name") {
        if repository.name_exists(name).await? {
            problems.push(ValidationProblem::for_field(
                "name",
                "That name is already taken. The name must be unique.",
            ));
        }
    }

    Ok(problems)
}
