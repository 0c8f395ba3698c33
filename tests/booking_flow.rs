mod common;

use axum::http::{Method, StatusCode};
use chrono::NaiveDate;
use common::MockBackend;
use serde_json::json;
use unicorn_telegram_rs::{
    booking::{AvailabilityKey, BookingScreen, TableStatus},
    data_types::booking_data_types::BookingField,
    errors::BookingError,
};

const AVAILABILITY: &str = "/reservations/tables/slot-availability";
const TABLE_SLOTS: &str = "/reservations/tables/10/slots";

async fn backend() -> MockBackend {
    MockBackend::start(vec![
        (
            Method::GET,
            AVAILABILITY,
            StatusCode::OK,
            json!([
                {"id": 10, "number": 1, "is_available": true, "capacity": 4},
                {"id": 11, "number": 2, "is_available": false, "capacity": 2}
            ]),
        ),
        (
            Method::GET,
            TABLE_SLOTS,
            StatusCode::OK,
            json!([
                {"start": "11:00", "end": "13:00", "is_available": false},
                {"start": "13:00", "end": "15:00", "is_available": true}
            ]),
        ),
        (
            Method::POST,
            "/reservations",
            StatusCode::CREATED,
            json!({"id": 99, "table_id": 10, "status": "confirmed"}),
        ),
    ])
    .await
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 24).unwrap()
}

fn key(screen: &BookingScreen, slot: usize) -> AvailabilityKey {
    AvailabilityKey {
        date: screen.date(),
        slot: screen.slots()[slot],
    }
}

#[tokio::test]
async fn availability_is_cached_per_date_and_slot() {
    let backend = backend().await;
    let api = backend.client("signed");
    let mut screen = BookingScreen::new(1, today());

    screen.load_availability(&api, false).await;
    screen.load_availability(&api, false).await;
    assert_eq!(backend.hits_on(Method::GET, AVAILABILITY), 1);
    assert_eq!(
        backend.hits()[0].query.as_deref(),
        Some("restaurant_id=1&date=2025-05-24&slot_start=11%3A00&slot_end=13%3A00")
    );

    // another slot is another key
    assert!(screen.set_active_slot(&api, 3).await);
    assert_eq!(backend.hits_on(Method::GET, AVAILABILITY), 2);

    // bypassing refetches but still refills the cache
    screen.load_availability(&api, true).await;
    screen.load_availability(&api, false).await;
    assert_eq!(backend.hits_on(Method::GET, AVAILABILITY), 3);

    let chart = screen.seating_chart();
    assert_eq!(chart.len(), 12);
    assert_eq!(chart[0], (1, TableStatus::Available));
    assert_eq!(chart[1], (2, TableStatus::Booked));
    assert_eq!(chart[2], (3, TableStatus::Unknown));
}

#[tokio::test]
async fn booking_a_table_invalidates_the_day() {
    let backend = backend().await;
    let api = backend.client("signed");
    let mut screen = BookingScreen::new(1, today());
    screen.load_availability(&api, false).await;
    assert!(screen.set_active_slot(&api, 3).await);
    assert!(screen.set_active_slot(&api, 0).await);
    assert_eq!(backend.hits_on(Method::GET, AVAILABILITY), 2);

    assert!(!screen.open_table(&api, 11).await);
    assert!(screen.open_table(&api, 10).await);
    assert_eq!(screen.table_slots().len(), 2);
    // the sheet always shows the current slot state
    screen.close_table();
    assert!(screen.open_table(&api, 10).await);
    assert_eq!(backend.hits_on(Method::GET, TABLE_SLOTS), 2);
    assert!(screen.choose_time(None));
    assert!(screen.details_sheet().is_open());

    // booked slots cannot be picked
    assert!(!screen.toggle_slot(0));
    match screen.submit(&api).await {
        Err(BookingError::Invalid(errors)) => assert_eq!(errors.len(), 4),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(backend.hits_on(Method::POST, "/reservations"), 0);

    screen.set_field(BookingField::Name, "Анна");
    screen.set_field(BookingField::Phone, "+7 900 000-00-00");
    screen.set_field(BookingField::Guests, "2");
    assert!(screen.toggle_slot(1));

    let reservation = screen.submit(&api).await.unwrap();
    assert_eq!(reservation.id, Some(99));
    assert!(!screen.details_sheet().is_visible());
    assert!(screen.errors().is_empty());

    let posted = backend
        .hits()
        .into_iter()
        .find(|hit| hit.method == Method::POST)
        .and_then(|hit| hit.body)
        .unwrap();
    assert_eq!(posted["table_id"], 10);
    assert_eq!(posted["reservation_time"], "2025-05-24T13:00:00Z");
    assert_eq!(posted["guest_count"], 2);
    assert_eq!(posted["duration"], 120);
    assert_eq!(posted["special_requests"], json!(null));

    // every slot of the day is dropped, the active one refetched past the cache
    assert!(screen.caches().availability().get(&key(&screen, 3)).is_none());
    assert!(screen.caches().availability().get(&key(&screen, 0)).is_some());
    assert_eq!(backend.hits_on(Method::GET, AVAILABILITY), 3);
    assert!(screen.open_table(&api, 10).await);
    assert_eq!(backend.hits_on(Method::GET, TABLE_SLOTS), 3);
}

#[tokio::test]
async fn closing_the_details_forgets_the_day() {
    let backend = backend().await;
    let api = backend.client("signed");
    let mut screen = BookingScreen::new(1, today());
    screen.load_availability(&api, false).await;
    assert!(screen.set_active_slot(&api, 3).await);
    assert!(screen.set_active_slot(&api, 0).await);

    assert!(screen.open_table(&api, 10).await);
    assert!(screen.choose_time(None));
    screen.set_field(BookingField::Name, "Анна");
    assert!(screen.toggle_slot(1));

    screen.close_details(&api).await;
    assert!(!screen.details_sheet().is_visible());
    assert_eq!(screen.selected_slot(), None);
    assert!(screen.caches().availability().get(&key(&screen, 3)).is_none());
    assert!(screen.caches().availability().get(&key(&screen, 0)).is_some());
    assert_eq!(backend.hits_on(Method::GET, AVAILABILITY), 3);
    assert_eq!(backend.hits_on(Method::POST, "/reservations"), 0);
}

#[tokio::test]
async fn past_dates_are_refused() {
    let backend = backend().await;
    let api = backend.client("signed");
    let mut screen = BookingScreen::new(1, today());

    assert!(!screen.pick_date(&api, today().pred_opt().unwrap()).await);
    assert_eq!(screen.date(), today());
    assert_eq!(backend.hits_on(Method::GET, AVAILABILITY), 0);
}
