mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use chrono::NaiveDate;
use common::MockBackend;
use serde_json::json;
use unicorn_telegram_rs::{
    data_backend::ApiClient,
    data_types::{profile_data_types::TelegramUser, CallbackAction, InputField},
    db_operations::MemoryStorage,
    host::HostEvent,
    init_data,
    orders::OrderPhase,
    router::Tab,
    session::{MiniApp, Outcome},
};

async fn backend(order_status: StatusCode) -> MockBackend {
    MockBackend::start(vec![
        (
            Method::GET,
            "/menu/categories",
            StatusCode::OK,
            json!([
                {"id": 1, "name": "Горячее"},
                {"id": 2, "name": "Новинки", "type": "new"}
            ]),
        ),
        (
            Method::GET,
            "/menu/items",
            StatusCode::OK,
            json!([
                {"id": 5, "name": "Борщ", "price": "300.00", "category_id": 1},
                {"id": 6, "name": "Пельмени", "price": 450, "category_id": 1}
            ]),
        ),
        (
            Method::GET,
            "/achievements",
            StatusCode::OK,
            json!([{"id": 1, "name": "Первый визит", "required_points": 10}]),
        ),
        (
            Method::POST,
            "/orders",
            order_status,
            json!({"id": 31, "status": "pending", "total_amount": "1050.00"}),
        ),
    ])
    .await
}

fn app(backend: &MockBackend) -> MiniApp {
    let user = TelegramUser {
        id: 77,
        first_name: Some("Анна".into()),
        ..Default::default()
    };
    let init = init_data::sign("1:TOKEN", &user, 1_716_000_000, None).unwrap();

    MiniApp::new(
        ApiClient::new(&backend.base_url, init),
        1,
        Arc::new(MemoryStorage::new()),
        NaiveDate::from_ymd_opt(2025, 5, 24).unwrap(),
    )
}

#[tokio::test]
async fn launch_loads_the_home_screen() {
    let backend = backend(StatusCode::CREATED).await;
    let mut app = app(&backend);
    app.launch().await;

    assert!(app.is_authenticated());
    assert_eq!(app.profile().display_name(), "Анна");
    assert_eq!(app.state().categories().items().len(), 2);
    assert_eq!(
        app.state().achievement().map(|a| a.name.as_str()),
        Some("Первый визит")
    );
    assert_eq!(app.state().novelty_category().map(|c| c.id), Some(2));

    // menu data is not fetched again when the menu opens
    app.navigate(Tab::Menu).await;
    assert_eq!(backend.hits_on(Method::GET, "/menu/categories"), 1);
    assert!(backend
        .hits()
        .iter()
        .all(|hit| hit.init_data.as_deref().is_some_and(|i| i.contains("hash="))));
}

#[tokio::test]
async fn dine_in_order_needs_a_table_and_clears_the_cart() {
    let backend = backend(StatusCode::CREATED).await;
    let mut app = app(&backend);
    app.launch().await;

    app.apply(CallbackAction::AddToCart(5)).await;
    app.apply(CallbackAction::AddToCart(6)).await;
    app.apply(CallbackAction::ChangeCount { id: 6, delta: 1 }).await;
    assert_eq!(app.state().cart().total_price(), 1200.0);
    app.apply(CallbackAction::ChangeCount { id: 5, delta: -1 }).await;
    assert_eq!(app.state().cart().total_count(), 2);

    app.navigate(Tab::Order).await;
    app.host_mut().drain_events();

    app.apply(CallbackAction::SubmitOrder).await;
    assert_eq!(
        app.host_mut().drain_events(),
        vec![HostEvent::Popup {
            title: "Ошибка".into(),
            message: "Укажите номер столика".into()
        }]
    );
    assert_eq!(backend.hits_on(Method::POST, "/orders"), 0);

    assert_eq!(
        app.apply(CallbackAction::EditTableNumber).await,
        Outcome::AskInput(InputField::TableNumber)
    );
    app.apply_input(InputField::TableNumber, "7");
    app.apply(CallbackAction::SubmitOrder).await;

    assert!(app.state().cart().is_empty());
    assert!(matches!(
        app.order().phase(),
        OrderPhase::Confirmed(Some(order)) if order.id == 31
    ));

    let posted = backend
        .hits()
        .into_iter()
        .find(|hit| hit.method == Method::POST)
        .and_then(|hit| hit.body)
        .unwrap();
    assert_eq!(posted["order_type"], "dine_in");
    assert_eq!(posted["table_number"], 7);
    assert_eq!(posted["items"][0]["menu_item_id"], 6);
    assert_eq!(posted["items"][0]["quantity"], 2);

    app.apply(CallbackAction::FinishOrder).await;
    assert_eq!(app.current_tab(), Tab::Menu);
}

#[tokio::test]
async fn failed_order_keeps_the_cart() {
    let backend = backend(StatusCode::INTERNAL_SERVER_ERROR).await;
    let mut app = app(&backend);
    app.launch().await;

    app.apply(CallbackAction::AddToCart(5)).await;
    app.apply(CallbackAction::Fulfillment(
        unicorn_telegram_rs::data_types::order_data_types::OrderType::Takeaway,
    ))
    .await;
    app.navigate(Tab::Order).await;
    app.host_mut().drain_events();

    app.apply(CallbackAction::SubmitOrder).await;
    assert_eq!(app.state().cart().total_count(), 1);
    assert!(matches!(app.order().phase(), OrderPhase::Failed(_)));
    assert_eq!(
        app.host_mut().drain_events(),
        vec![HostEvent::Popup {
            title: "Ошибка".into(),
            message: "Не удалось оформить заказ. Попробуйте ещё раз.".into()
        }]
    );
}

#[tokio::test]
async fn renewed_init_data_signs_later_requests() {
    let backend = backend(StatusCode::CREATED).await;
    let mut app = app(&backend);
    app.launch().await;

    let user = app.profile().user().cloned().unwrap();
    let fresh = init_data::sign("1:TOKEN", &user, 1_716_003_600, None).unwrap();
    app.renew_init_data(&fresh);
    // an empty payload keeps the current one
    app.renew_init_data("");
    assert_eq!(app.host().init_data(), fresh);
    assert!(app.is_authenticated());

    app.refresh().await;
    let last = backend.hits().pop().unwrap();
    assert_eq!(last.init_data.as_deref(), Some(fresh.as_str()));
    assert_eq!(app.profile().display_name(), "Анна");
}
