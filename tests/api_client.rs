mod common;

use axum::http::{Method, StatusCode};
use common::MockBackend;
use serde_json::{json, Value};
use unicorn_telegram_rs::{
    data_backend::{menu_api, order_api},
    errors::ApiError,
};

#[tokio::test]
async fn requests_carry_init_data_and_query() {
    let backend = MockBackend::start(vec![(
        Method::GET,
        "/menu/categories",
        StatusCode::OK,
        json!([{"id": 1, "name": "Супы"}, {"id": 2, "name": "Коктейли", "type": "bar"}]),
    )])
    .await;

    let api = backend.client("query_id=1&hash=abc");
    let categories = menu_api::get_categories(&api, 3).await.unwrap();
    assert_eq!(categories.len(), 2);
    assert!(categories[1].has_type("bar"));

    let hits = backend.hits();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].init_data.as_deref(), Some("query_id=1&hash=abc"));
    assert_eq!(hits[0].query.as_deref(), Some("restaurant_id=3"));
}

#[tokio::test]
async fn error_bodies_become_messages() {
    let backend = MockBackend::start(vec![
        (
            Method::POST,
            "/reservations",
            StatusCode::BAD_REQUEST,
            json!({"detail": "Столик уже занят"}),
        ),
        (Method::POST, "/orders", StatusCode::INTERNAL_SERVER_ERROR, Value::Null),
    ])
    .await;
    let api = backend.client("");

    match api.post("/reservations", &json!({})).await {
        Err(ApiError::Http { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Столик уже занят");
        }
        other => panic!("unexpected {:?}", other),
    }

    let err = api.post("/orders", &json!({})).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn non_list_answer_is_an_empty_list() {
    let backend = MockBackend::start(vec![
        (
            Method::GET,
            "/menu/items",
            StatusCode::OK,
            json!({"detail": "no items"}),
        ),
        (Method::GET, "/orders", StatusCode::OK, Value::Null),
    ])
    .await;
    let api = backend.client("");

    assert!(menu_api::get_dishes(&api, 1, Some(4))
        .await
        .unwrap()
        .is_empty());
    assert!(order_api::get_orders(&api).await.unwrap().is_empty());
    assert_eq!(
        backend.hits()[0].query.as_deref(),
        Some("restaurant_id=1&category_id=4")
    );
}

#[tokio::test]
async fn delete_sends_body_only_when_non_empty() {
    let backend = MockBackend::start(vec![(
        Method::DELETE,
        "/reservations/5",
        StatusCode::NO_CONTENT,
        Value::Null,
    )])
    .await;
    let api = backend.client("");

    assert_eq!(
        api.delete("/reservations/5", Some(&json!({}))).await.unwrap(),
        Value::Null
    );
    api.delete("/reservations/5", Some(&json!({"reason": "plans changed"})))
        .await
        .unwrap();

    let hits = backend.hits();
    assert_eq!(hits[0].body, None);
    assert_eq!(hits[1].body, Some(json!({"reason": "plans changed"})));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let api = unicorn_telegram_rs::data_backend::ApiClient::new("http://127.0.0.1:9", "");
    let err = menu_api::get_categories(&api, 1).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
}
