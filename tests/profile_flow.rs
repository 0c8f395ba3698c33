mod common;

use axum::http::{Method, StatusCode};
use common::MockBackend;
use serde_json::json;
use unicorn_telegram_rs::{
    constants::PROFILE_TTL,
    data_types::profile_data_types::ProfileField,
    profile::{ProfileScreen, SaveState},
};

async fn backend() -> MockBackend {
    MockBackend::start(vec![
        (
            Method::GET,
            "/users/me",
            StatusCode::OK,
            json!({"first_name": "Анна", "phone_number": "+7 900 000-00-00"}),
        ),
        (
            Method::PUT,
            "/users/me",
            StatusCode::OK,
            json!({"first_name": "Аня", "phone_number": "+7 900 000-00-00"}),
        ),
    ])
    .await
}

#[tokio::test(start_paused = true)]
async fn profile_is_cached_for_ten_minutes() {
    let backend = backend().await;
    let api = backend.client("signed");
    let mut screen = ProfileScreen::new(None);

    screen.load_profile(&api).await;
    tokio::time::advance(PROFILE_TTL / 2).await;
    screen.load_profile(&api).await;
    assert_eq!(backend.hits_on(Method::GET, "/users/me"), 1);
    assert_eq!(
        screen.profile().and_then(|p| p.first_name.as_deref()),
        Some("Анна")
    );

    tokio::time::advance(PROFILE_TTL).await;
    screen.load_profile(&api).await;
    assert_eq!(backend.hits_on(Method::GET, "/users/me"), 2);
}

#[tokio::test(start_paused = true)]
async fn saving_drops_the_cached_profile() {
    let backend = backend().await;
    let api = backend.client("signed");
    let mut screen = ProfileScreen::new(None);

    screen.open_edit(&api).await;
    assert!(screen.edit_sheet().is_open());
    assert_eq!(screen.form().first_name, "Анна");
    assert!(screen.caches().profile().get(&()).is_some());

    screen.set_field(ProfileField::FirstName, "  Аня ");
    screen.save(&api).await.unwrap();

    assert_eq!(*screen.save_state(), SaveState::Saved);
    assert!(!screen.edit_sheet().is_open());
    assert!(screen.caches().profile().get(&()).is_none());

    let put = backend
        .hits()
        .into_iter()
        .find(|hit| hit.method == Method::PUT)
        .and_then(|hit| hit.body)
        .unwrap();
    assert_eq!(put["first_name"], "Аня");
    assert_eq!(put["last_name"], "");

    // still well inside the TTL, yet the next read goes to the backend
    screen.load_profile(&api).await;
    assert_eq!(backend.hits_on(Method::GET, "/users/me"), 2);
}
