use std::sync::Arc;

use unicorn_telegram_rs::{
    cart::PersistentCart,
    constants::CART_STORAGE_KEY,
    data_types::menu_data_types::Dish,
    db_operations::{LocalStorage, SqliteStorage},
};

fn dish(id: u64, price: f64) -> Dish {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Блюдо {}", id),
        "price": price,
    }))
    .unwrap()
}

#[test]
fn chats_do_not_share_storage() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("unicorn.sqlite");

    let first = SqliteStorage::open(&db, 1).unwrap();
    let second = SqliteStorage::open(&db, 2).unwrap();

    first.set_item("k", "one").unwrap();
    first.set_item("k", "two").unwrap();
    assert_eq!(first.get_item("k").unwrap().as_deref(), Some("two"));
    assert_eq!(second.get_item("k").unwrap(), None);

    first.remove_item("k").unwrap();
    assert_eq!(first.get_item("k").unwrap(), None);
}

#[test]
fn cart_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("unicorn.sqlite");

    {
        let storage = Arc::new(SqliteStorage::open(&db, 42).unwrap());
        let mut cart = PersistentCart::load(storage);
        cart.add(&dish(1, 450.0), 1);
        cart.add(&dish(2, 120.5), 3);
        cart.change_count(1, 1);
    }

    let storage = Arc::new(SqliteStorage::open(&db, 42).unwrap());
    let raw = storage.get_item(CART_STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"count\":2"));

    let cart = PersistentCart::load(storage);
    assert_eq!(cart.cart().count_of(1), 2);
    assert_eq!(cart.cart().count_of(2), 3);
    assert_eq!(cart.cart().total_count(), 5);
    assert_eq!(cart.cart().total_price(), 2.0 * 450.0 + 3.0 * 120.5);
}

#[test]
fn unreadable_cart_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(SqliteStorage::open(dir.path().join("unicorn.sqlite"), 7).unwrap());
    storage.set_item(CART_STORAGE_KEY, "{not json").unwrap();

    let cart = PersistentCart::load(storage);
    assert!(cart.cart().is_empty());
}
