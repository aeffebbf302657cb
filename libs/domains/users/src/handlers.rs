use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath,
    errors::handlers::not_found,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, InternalServerErrorResponse, NotFoundResponse,
        UnprocessableEntityResponse,
    },
};
use serde_json::Value;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{UserFilter, UserPayload, UserView};
use crate::repository::UserRepository;
use crate::service::UserService;
use crate::validation::ValidationProblem;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(
        schemas(UserView, ValidationProblem),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestUuidResponse,
            UnprocessableEntityResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .fallback(not_found)
        .with_state(shared_service)
}

/// List users with an optional exact-name filter
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(UserFilter),
    responses(
        (status = 200, description = "List of users", body = Vec<UserView>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(filter): Query<UserFilter>,
) -> UserResult<Json<Vec<UserView>>> {
    let users = service.list_users(filter).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = Value,
    responses(
        (status = 201, description = "User created successfully", body = UserView),
        (status = 400, response = BadRequestResponse),
        (status = 422, response = UnprocessableEntityResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Json(payload): Json<UserPayload>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserView),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserView>> {
    let user = service.get_user(id).await?;
    Ok(Json(UserView::from(user)))
}

/// Update a user
///
/// The raw path segment must match the `id` field of the body byte-for-byte
/// before anything else happens; on mismatch the store is never touched.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = Value,
    responses(
        (status = 204, description = "User updated successfully"),
        (status = 400, response = BadRequestResponse),
        (status = 422, response = UnprocessableEntityResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
    Json(payload): Json<UserPayload>,
) -> UserResult<StatusCode> {
    let body_id = payload.get("id").and_then(Value::as_str);
    if body_id != Some(id.as_str()) {
        return Err(UserError::IdentityMismatch {
            body: body_id.map(str::to_owned),
            path: id,
        });
    }

    let user_id = Uuid::parse_str(&id).map_err(|_| UserError::InvalidId(id.clone()))?;
    service.update_user(user_id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted (idempotent)"),
        (status = 400, response = BadRequestUuidResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<StatusCode> {
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
