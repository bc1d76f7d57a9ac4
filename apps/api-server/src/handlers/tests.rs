use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use quill_infra::JwtConfig;

use super::configure_routes;
use crate::state::AppState;

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::in_memory(&JwtConfig {
                    secret: "handler-test-secret".into(),
                    expiration_hours: 1,
                    issuer: "quill-test".into(),
                })))
                .configure(configure_routes),
        )
        .await
    };
}

fn register_req(name: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": name,
            "email": format!("{name}@x.com"),
            "password": "secret123",
        }))
}

fn create_req(token: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .set_json(body)
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_register_login_and_create() {
    let app = init_app!();

    let res = test::call_service(&app, register_req("alice").to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "alice@x.com", "password": "secret123"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let login: Value = test::read_body_json(res).await;
    let token = login["token"].as_str().unwrap().to_string();
    assert_eq!(login["user"]["username"], "alice");
    assert_eq!(login["expiresIn"], 3600);

    let req = create_req(&token, json!({"title": "Hi there", "body": "0123456789"})).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    assert_eq!(created["message"], "Post created successfully");
    assert_eq!(created["post"]["status"], "published");
    assert_eq!(created["post"]["excerpt"], "0123456789");
    assert_eq!(created["post"]["readTime"], 1);
    assert_eq!(created["post"]["author"]["username"], "alice");

    let id = created["post"]["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["title"], "Hi there");
    assert_eq!(fetched["author"]["email"], "alice@x.com");
}

#[actix_web::test]
async fn test_me_requires_token() {
    let app = init_app!();
    let session: Value = test::call_and_read_body_json(&app, register_req("alice").to_request()).await;
    let token = session["token"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(token))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["username"], "alice");

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_without_token_is_unauthenticated() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"title": "Hi there", "body": "0123456789"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Unauthenticated");
    assert_eq!(body["message"], "Access denied. No token provided.");

    let req = create_req("not-a-jwt", json!({"title": "Hi there", "body": "0123456789"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_registration_errors() {
    let app = init_app!();
    test::call_service(&app, register_req("alice").to_request()).await;

    let res = test::call_service(&app, register_req("alice").to_request()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"username": "x", "email": "nope", "password": "123"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"].as_array().unwrap().len(), 3);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "alice@x.com", "password": "wrong-one"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_only_author_can_mutate() {
    let app = init_app!();
    let alice: Value = test::call_and_read_body_json(&app, register_req("alice").to_request()).await;
    let bob: Value = test::call_and_read_body_json(&app, register_req("bob").to_request()).await;
    let alice_token = alice["token"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    let created: Value = test::call_and_read_body_json(
        &app,
        create_req(alice_token, json!({"title": "Alice writes", "body": "0123456789"}))
            .to_request(),
    )
    .await;
    let uri = format!("/api/posts/{}", created["post"]["id"].as_str().unwrap());

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(bob_token))
        .set_json(json!({"title": "Bob was here"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(bob_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(alice_token))
        .set_json(json!({"tags": ["rust", " web ", "rust", ""]}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["message"], "Post updated successfully");
    assert_eq!(updated["post"]["title"], "Alice writes");
    assert_eq!(updated["post"]["tags"], json!(["rust", "web"]));

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(alice_token))
        .to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted["message"], "Post deleted successfully");

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_draft_is_hidden_from_others() {
    let app = init_app!();
    let alice: Value = test::call_and_read_body_json(&app, register_req("alice").to_request()).await;
    let token = alice["token"].as_str().unwrap();

    let created: Value = test::call_and_read_body_json(
        &app,
        create_req(
            token,
            json!({"title": "Secret plans", "body": "0123456789", "status": "draft"}),
        )
        .to_request(),
    )
    .await;
    let uri = format!("/api/posts/{}", created["post"]["id"].as_str().unwrap());

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let listing: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/posts").to_request())
            .await;
    assert_eq!(listing["pagination"]["total"], 0);
}

#[actix_web::test]
async fn test_unknown_status_is_rejected() {
    let app = init_app!();
    let alice: Value = test::call_and_read_body_json(&app, register_req("alice").to_request()).await;

    let req = create_req(
        alice["token"].as_str().unwrap(),
        json!({"title": "Hi there", "body": "0123456789", "status": "archived"}),
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"][0]["field"], "status");
}

#[actix_web::test]
async fn test_listing_envelope_and_pagination_errors() {
    let app = init_app!();
    let alice: Value = test::call_and_read_body_json(&app, register_req("alice").to_request()).await;
    let token = alice["token"].as_str().unwrap();

    for i in 0..6 {
        let req = create_req(
            token,
            json!({"title": format!("Post number {i}"), "body": "Plain body text"}),
        )
        .to_request();
        test::call_service(&app, req).await;
    }

    let listing: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/posts").to_request())
            .await;
    assert_eq!(listing["data"].as_array().unwrap().len(), 5);
    assert_eq!(
        listing["pagination"],
        json!({"page": 1, "limit": 5, "total": 6, "totalPages": 2, "hasNext": true, "hasPrev": false})
    );

    let uri = format!("/api/posts/author/{}?page=2", alice["user"]["id"].as_str().unwrap());
    let by_author: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(by_author["data"].as_array().unwrap().len(), 1);
    assert_eq!(by_author["pagination"]["hasPrev"], true);

    let req = test::TestRequest::get().uri("/api/posts?limit=100").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"][0]["field"], "limit");

    for uri in ["/api/posts?page=0", "/api/posts?page=abc"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn test_malformed_inputs() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/posts/not-an-id").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/posts/author/bogus").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(header::ContentType::json())
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Validation failed");
}

#[actix_web::test]
async fn test_health() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_far_page_is_empty_not_wrapped() {
    let app = init_app!();
    let alice: Value = test::call_and_read_body_json(&app, register_req("alice").to_request()).await;
    let token = alice["token"].as_str().unwrap();

    for i in 0..3 {
        let req = create_req(
            token,
            json!({"title": format!("Post number {i}"), "body": "Plain body text"}),
        )
        .to_request();
        test::call_service(&app, req).await;
    }

    // (page - 1) * limit wraps to 0 here without saturation
    let req = test::TestRequest::get()
        .uri("/api/posts?page=9223372036854775809&limit=2")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let listing: Value = test::read_body_json(res).await;
    assert!(listing["data"].as_array().unwrap().is_empty());
    assert_eq!(listing["pagination"]["page"], 9_223_372_036_854_775_809u64);
    assert_eq!(listing["pagination"]["total"], 3);
    assert_eq!(listing["pagination"]["totalPages"], 2);
    assert_eq!(listing["pagination"]["hasNext"], false);
    assert_eq!(listing["pagination"]["hasPrev"], true);

    let req = test::TestRequest::get()
        .uri("/api/posts?page=18446744073709551615&limit=50")
        .to_request();
    let listing: Value = test::call_and_read_body_json(&app, req).await;
    assert!(listing["data"].as_array().unwrap().is_empty());
    assert_eq!(listing["pagination"]["total"], 3);
}
