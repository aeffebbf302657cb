//! Handler tests for the Users domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Request deserialization (raw JSON -> validated payload)
//! - Response serialization (views never leak the password)
//! - HTTP status codes
//! - Error responses with the full problem list
//!
//! Unlike E2E tests, these test ONLY the users domain router,
//! not the full application with docs routes, CORS middleware, etc.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::{TestDataBuilder, TestMongo};
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn setup() -> (TestMongo, UserService<MongoUserRepository>, Router) {
    let mongo = TestMongo::new().await;
    let repo = MongoUserRepository::new(mongo.database());
    repo.init_indexes().await.unwrap();
    let service = UserService::new(repo);
    let app = handlers::router(service.clone());
    (mongo, service, app)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_create_user_handler_returns_201_with_view() {
    let (_mongo, _service, app) = setup().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "name": "Alice123", "password": "longenoughpassword" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let view = json_body(response.into_body()).await;
    assert_eq!(view["name"], "Alice123");
    assert!(!view["id"].as_str().unwrap().is_empty());
    assert!(view.get("password").is_none());
}

#[tokio::test]
async fn test_create_user_handler_reports_every_problem() {
    let (_mongo, _service, app) = setup().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "name": "ab", "password": "short" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response.into_body()).await;
    let problems = body["details"].as_array().unwrap();
    assert_eq!(problems.len(), 2);
    assert_eq!(problems[0]["field"], "name");
    assert_eq!(problems[1]["field"], "password");
}

#[tokio::test]
async fn test_create_user_handler_missing_fields() {
    let (_mongo, _service, app) = setup().await;

    let response = app.oneshot(json_request("POST", "/", json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response.into_body()).await;
    let problems = body["details"].as_array().unwrap();
    assert_eq!(problems.len(), 2);
    assert!(problems.iter().all(|p| p["message"]
        .as_str()
        .unwrap()
        .contains("missing")));
}

#[tokio::test]
async fn test_create_user_handler_duplicate_name() {
    let (_mongo, service, app) = setup().await;
    let builder = TestDataBuilder::from_test_name("handler_duplicate");
    let name = builder.name("user", "taken");

    let payload = json!({ "name": name, "password": "longenoughpassword" });
    service
        .create_user(payload.as_object().unwrap().clone())
        .await
        .unwrap();

    let response = app.oneshot(json_request("POST", "/", payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response.into_body()).await;
    let problems = body["details"].as_array().unwrap();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0]["field"], "name");
    assert!(problems[0]["message"].as_str().unwrap().contains("unique"));
}

#[tokio::test]
async fn test_get_user_handler_returns_200() {
    let (_mongo, service, app) = setup().await;

    let user = service
        .create_user(
            json!({ "name": "Alice123", "password": "longenoughpassword" })
                .as_object()
                .unwrap()
                .clone(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(get_request(&format!("/{}", user.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let view = json_body(response.into_body()).await;
    assert_eq!(view["id"], user.id.to_string());
    assert_eq!(view["name"], "Alice123");
    assert!(view.get("password").is_none());
}

#[tokio::test]
async fn test_get_user_handler_absent_returns_404() {
    let (_mongo, _service, app) = setup().await;

    let response = app
        .oneshot(get_request(&format!("/{}", uuid::Uuid::now_v7())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_user_handler_invalid_uuid_returns_400() {
    let (_mongo, _service, app) = setup().await;

    let response = app.oneshot(get_request("/not-a-uuid")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users_handler_filters_and_strips_password() {
    // No unique index here: the filter must return every record carrying the
    // name, even when duplicates exist in the store
    let mongo = TestMongo::new().await;
    let repo = MongoUserRepository::new(mongo.database());

    for password in ["longenoughpassword", "anotherlongpassword"] {
        repo.create(CreateUser {
            name: "Bob1234".to_string(),
            password: password.to_string(),
        })
        .await
        .unwrap();
    }
    repo.create(CreateUser {
        name: "Alice123".to_string(),
        password: "longenoughpassword".to_string(),
    })
    .await
    .unwrap();

    let app = handlers::router(UserService::new(repo));

    let response = app.oneshot(get_request("/?name=Bob1234")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let views = json_body(response.into_body()).await;
    let views = views.as_array().unwrap();
    assert_eq!(views.len(), 2);
    for view in views {
        assert_eq!(view["name"], "Bob1234");
        assert!(view.get("password").is_none());
    }
}

#[tokio::test]
async fn test_update_user_handler_returns_204_and_applies_subset() {
    let (_mongo, service, app) = setup().await;

    let user = service
        .create_user(
            json!({ "name": "Alice123", "password": "longenoughpassword" })
                .as_object()
                .unwrap()
                .clone(),
        )
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/{}", user.id),
            json!({ "id": user.id.to_string(), "name": "Alice456" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let updated = service.get_user(user.id).await.unwrap();
    assert_eq!(updated.name, "Alice456");
    // Fields absent from the payload stay untouched
    assert_eq!(updated.password, "longenoughpassword");
}

#[tokio::test]
async fn test_update_user_handler_identity_mismatch_returns_400() {
    let (_mongo, service, app) = setup().await;

    let user = service
        .create_user(
            json!({ "name": "Alice123", "password": "longenoughpassword" })
                .as_object()
                .unwrap()
                .clone(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", user.id),
            json!({ "id": uuid::Uuid::now_v7().to_string(), "name": "Mallory1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The store was never touched
    let unchanged = service.get_user(user.id).await.unwrap();
    assert_eq!(unchanged.name, "Alice123");
}

#[tokio::test]
async fn test_update_user_handler_missing_body_id_returns_400() {
    let (_mongo, _service, app) = setup().await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", uuid::Uuid::now_v7()),
            json!({ "name": "Alice456" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user_handler_validation_problems_return_422() {
    let (_mongo, service, app) = setup().await;

    let user = service
        .create_user(
            json!({ "name": "Alice123", "password": "longenoughpassword" })
                .as_object()
                .unwrap()
                .clone(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", user.id),
            json!({ "id": user.id.to_string(), "password": "short" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response.into_body()).await;
    let problems = body["details"].as_array().unwrap();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0]["field"], "password");
}

#[tokio::test]
async fn test_delete_user_handler_is_idempotent() {
    let (_mongo, service, app) = setup().await;

    let user = service
        .create_user(
            json!({ "name": "Alice123", "password": "longenoughpassword" })
                .as_object()
                .unwrap()
                .clone(),
        )
        .await
        .unwrap();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/{}", user.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
async fn test_unmatched_route_returns_structured_404() {
    let (_mongo, _service, app) = setup().await;

    let response = app
        .oneshot(get_request(&format!("/{}/extra", uuid::Uuid::now_v7())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");
}
