mod common;

use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use shortener::utils::id_generator::short_id;

#[tokio::test]
async fn test_shorten_text_creates_short_url() {
    let app = common::spawn_app();

    let response = app.server.post("/").text("https://example.com/page").await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.text(),
        format!("{}/{}", common::BASE_URL, short_id("https://example.com/page"))
    );
}

#[tokio::test]
async fn test_shorten_text_conflict_returns_existing() {
    let app = common::spawn_app();

    let first = app.server.post("/").text("https://example.com/dup").await;
    first.assert_status(StatusCode::CREATED);

    let second = app.server.post("/").text("https://example.com/dup").await;
    second.assert_status(StatusCode::CONFLICT);
    assert_eq!(second.text(), first.text());
}

#[tokio::test]
async fn test_shorten_text_rejects_bad_input() {
    let app = common::spawn_app();

    app.server
        .post("/")
        .text("")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = app.server.post("/").text("not a url").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_shorten_json() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/json" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(
        body["result"],
        format!("{}/{}", common::BASE_URL, short_id("https://example.com/json"))
    );

    let again = app
        .server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/json" }))
        .await;
    again.assert_status(StatusCode::CONFLICT);
    assert_eq!(again.json::<Value>()["result"], body["result"]);
}

#[tokio::test]
async fn test_shorten_json_rejects_empty_url() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/shorten")
        .json(&json!({ "url": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shorten_batch() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/shorten/batch")
        .json(&json!([
            { "correlation_id": "1", "original_url": "https://a.example/" },
            { "correlation_id": "2", "original_url": "https://b.example/" }
        ]))
        .await;

    response.assert_status(StatusCode::CREATED);
    let items = response.json::<Vec<Value>>();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["correlation_id"], "1");
    assert_eq!(
        items[1]["short_url"],
        format!("{}/{}", common::BASE_URL, short_id("https://b.example/"))
    );

    let redirect = app
        .server
        .get(&format!("/{}", short_id("https://a.example/")))
        .await;
    redirect.assert_status(StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_shorten_batch_is_all_or_nothing() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/shorten/batch")
        .json(&json!([
            { "correlation_id": "1", "original_url": "https://ok.example/" },
            { "correlation_id": "2", "original_url": "::broken::" }
        ]))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let lookup = app
        .server
        .get(&format!("/{}", short_id("https://ok.example/")))
        .await;
    lookup.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shorten_batch_rejects_empty() {
    let app = common::spawn_app();

    app.server
        .post("/api/shorten/batch")
        .json(&json!([]))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_new_visitor_gets_cookie() {
    let app = common::spawn_app();

    let response = app.server.post("/").text("https://example.com/c").await;

    let cookie = response.header(header::SET_COOKIE);
    let cookie = cookie.to_str().unwrap();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_valid_cookie_is_not_reissued() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/")
        .add_header(header::COOKIE, app.cookie_for("user-1"))
        .text("https://example.com/known")
        .await;

    response.assert_status(StatusCode::CREATED);
    assert!(response.maybe_header(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_forged_cookie_is_replaced() {
    let app = common::spawn_app();

    let response = app
        .server
        .get("/api/user/urls")
        .add_header(
            header::COOKIE,
            axum::http::HeaderValue::from_static("auth_token=user-1.deadbeef"),
        )
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.maybe_header(header::SET_COOKIE).is_some());
}
