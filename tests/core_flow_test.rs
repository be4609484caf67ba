//! Core Flow Integration Tests
//!
//! Drives the post-service HTTP surface end to end on the in-memory store:
//! 1. Register and log in, create a post, read it back
//! 2. Like toggling is reversible
//! 3. Comment creation and the comment deletion rules
//! 4. Authentication and ownership failures map to 401 / 403
//!
//! Run: cargo test --test core_flow_test

use actix_web::{http::StatusCode, test};
use post_service::{config::Config, db::MemoryStore, models::RegisterRequest, AppState};
use serde_json::{json, Value};
use std::sync::{Arc, Once};

const SECRET: &str = "core-flow-test-secret-0123456789abcdef";

static INIT: Once = Once::new();

fn state() -> AppState {
    INIT.call_once(|| {
        crypto_core::jwt::initialize_jwt_secret(SECRET, 1).expect("Failed to init JWT secret");
    });
    AppState::new(Arc::new(MemoryStore::new()), Config::with_secret(SECRET))
}

/// Register `name` and return its id and a ready-made Authorization value
async fn register(state: &AppState, name: &str) -> (String, String) {
    let auth = state
        .accounts()
        .register(RegisterRequest {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password: "secret1".to_string(),
        })
        .await
        .expect("registration should succeed");
    (auth.user.id.to_string(), format!("Bearer {}", auth.token))
}

#[actix_web::test]
async fn test_post_lifecycle() {
    let state = state();
    let app = test::init_service(post_service::app(state.clone())).await;
    let (ann_id, ann) = register(&state, "ann").await;

    // Login issues a working token too
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "ANN@example.com", "password": "secret1"}))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(login["id"], ann_id.as_str());
    assert!(login.get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", ann.clone()))
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(resp).await;
    assert_eq!(post["title"], "Hello");
    assert_eq!(post["content"], "World");
    assert_eq!(post["author"]["id"], ann_id.as_str());
    assert_eq!(post["likes"], json!([]));
    assert_eq!(post["comments"], json!([]));
    let post_id = post["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", ann.clone()))
        .set_json(json!({"content": "Everyone"}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["title"], "Hello");
    assert_eq!(updated["content"], "Everyone");

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", ann.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Post removed");

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_like_toggle_is_reversible() {
    let state = state();
    let app = test::init_service(post_service::app(state.clone())).await;
    let (_, ann) = register(&state, "ann").await;
    let (bob_id, bob) = register(&state, "bob").await;

    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", ann))
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = post["id"].as_str().unwrap();

    let like = || {
        test::TestRequest::put()
            .uri(&format!("/posts/{post_id}/like"))
            .insert_header(("Authorization", bob.clone()))
            .to_request()
    };

    let likes: Value = test::call_and_read_body_json(&app, like()).await;
    assert_eq!(likes.as_array().unwrap().len(), 1);
    assert_eq!(likes[0]["user"]["id"], bob_id.as_str());
    assert_eq!(likes[0]["user"]["name"], "bob");

    let likes: Value = test::call_and_read_body_json(&app, like()).await;
    assert_eq!(likes, json!([]));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["likes"], json!([]));
}

#[actix_web::test]
async fn test_comment_rules() {
    let state = state();
    let app = test::init_service(post_service::app(state.clone())).await;
    let (_, ann) = register(&state, "ann").await;
    let (bob_id, bob) = register(&state, "bob").await;
    let (_, carl) = register(&state, "carl").await;

    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", ann.clone()))
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = post["id"].as_str().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/comments"))
        .insert_header(("Authorization", bob.clone()))
        .set_json(json!({"text": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/comments"))
        .insert_header(("Authorization", bob.clone()))
        .set_json(json!({"text": "nice post"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comments: Value = test::read_body_json(resp).await;
    assert_eq!(comments[0]["text"], "nice post");
    assert_eq!(comments[0]["author"]["id"], bob_id.as_str());
    let comment_id = comments[0]["id"].as_str().unwrap();

    let delete = |token: &str| {
        test::TestRequest::delete()
            .uri(&format!("/posts/{post_id}/comments/{comment_id}"))
            .insert_header(("Authorization", token.to_string()))
            .to_request()
    };

    // Neither the comment's author nor the post's author
    let resp = test::call_service(&app, delete(&carl)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The post's author may remove any comment
    let body: Value = test::call_and_read_body_json(&app, delete(&ann)).await;
    assert_eq!(body["message"], "Comment removed");

    let resp = test::call_service(&app, delete(&bob)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_auth_and_ownership_failures() {
    let state = state();
    let app = test::init_service(post_service::app(state.clone())).await;
    let (_, ann) = register(&state, "ann").await;
    let (_, bob) = register(&state, "bob").await;

    // Missing token
    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Garbage token is rejected even on public reads
    let req = test::TestRequest::get()
        .uri("/posts")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", ann))
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = post["id"].as_str().unwrap();

    // Anonymous update and delete of an existing post
    let req = test::TestRequest::put()
        .uri(&format!("/posts/{post_id}"))
        .set_json(json!({"title": "Mine now"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}"))
        .to_request();
    let unchanged: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unchanged["title"], "Hello");

    let req = test::TestRequest::put()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", bob.clone()))
        .set_json(json!({"title": "Mine now"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Not authorized to update this post");

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "ann@example.com", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_profile_update() {
    let state = state();
    let app = test::init_service(post_service::app(state.clone())).await;
    let (ann_id, ann) = register(&state, "ann").await;

    let req = test::TestRequest::put()
        .uri("/auth/profile")
        .insert_header(("Authorization", ann.clone()))
        .set_json(json!({"name": "Ann Lee", "bio": "Writes things"}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["name"], "Ann Lee");
    assert!(updated["token"].as_str().is_some());

    let req = test::TestRequest::get()
        .uri("/auth/profile")
        .insert_header(("Authorization", ann))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["id"], ann_id.as_str());
    assert_eq!(profile["bio"], "Writes things");

    let req = test::TestRequest::get().uri("/auth/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
