use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    constants::CART_STORAGE_KEY,
    data_types::menu_data_types::Dish,
    db_operations::LocalStorage,
    errors::StorageError,
};

/// A dish in the cart. Serialized as the dish object plus `count`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CartItem {
    #[serde(flatten)]
    pub dish: Dish,
    pub count: u32,
}

impl CartItem {
    pub fn id(&self) -> u64 {
        self.dish.id
    }

    pub fn subtotal(&self) -> f64 {
        self.dish.price * f64::from(self.count)
    }
}

/// Cart items keyed by dish id, in insertion order. Counts never drop below
/// one: an item reaching zero is removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserts the dish or bumps its count. A quantity of 0 counts as 1.
    pub fn add(&mut self, dish: &Dish, quantity: u32) {
        let quantity = quantity.max(1);
        match self.items.iter_mut().find(|item| item.dish.id == dish.id) {
            Some(item) => item.count = item.count.saturating_add(quantity),
            None => self.items.push(CartItem {
                dish: dish.clone(),
                count: quantity,
            }),
        }
    }

    /// Clamps at zero and drops the item there. Unknown ids are ignored.
    pub fn change_count(&mut self, id: u64, delta: i64) {
        for item in self.items.iter_mut().filter(|item| item.dish.id == id) {
            let next = i64::from(item.count)
                .saturating_add(delta)
                .clamp(0, i64::from(u32::MAX));
            item.count = next as u32;
        }
        self.items.retain(|item| item.count > 0);
    }

    pub fn remove(&mut self, id: u64) {
        self.items.retain(|item| item.dish.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn count_of(&self, id: u64) -> u32 {
        self.items
            .iter()
            .find(|item| item.dish.id == id)
            .map_or(0, |item| item.count)
    }

    pub fn total_count(&self) -> u32 {
        self.items.iter().map(|item| item.count).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Lenient: unreadable data gives an empty cart, zero counts are dropped.
    pub fn from_json(json: &str) -> Cart {
        match serde_json::from_str::<Vec<CartItem>>(json) {
            Ok(mut items) => {
                items.retain(|item| item.count > 0);
                Cart { items }
            }
            Err(e) => {
                log::warn!("Stored cart is unreadable, starting empty: {}", e);
                Cart::default()
            }
        }
    }
}

/// Cart mirrored into local storage after every change.
pub struct PersistentCart {
    cart: Cart,
    storage: Arc<dyn LocalStorage>,
}

impl PersistentCart {
    /// rehydrates whatever was stored under `cartItems`
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        let cart = match storage.get_item(CART_STORAGE_KEY) {
            Ok(Some(json)) => Cart::from_json(&json),
            Ok(None) => Cart::default(),
            Err(e) => {
                log::error!("Could not read stored cart: {}", e);
                Cart::default()
            }
        };

        PersistentCart { cart, storage }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add(&mut self, dish: &Dish, quantity: u32) {
        self.cart.add(dish, quantity);
        self.persist();
    }

    pub fn change_count(&mut self, id: u64, delta: i64) {
        self.cart.change_count(id, delta);
        self.persist();
    }

    pub fn remove(&mut self, id: u64) {
        self.cart.remove(id);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            log::error!("Could not store cart: {}", e);
        }
    }

    fn try_persist(&self) -> Result<(), StorageError> {
        let json = self.cart.to_json()?;
        self.storage.set_item(CART_STORAGE_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data_types::CallbackAction, db_operations::MemoryStorage};

    fn dish(id: u64, price: f64) -> Dish {
        Dish {
            id,
            name: format!("dish {}", id),
            price,
            image_url: None,
            description: None,
            volume: None,
            volume_weight_display: Some("250 г".into()),
            category_id: Some(1),
            is_archived: false,
        }
    }

    #[test]
    fn decrement_to_zero_removes_and_stays_removed() {
        let mut cart = Cart::new();
        cart.add(&dish(5, 300.0), 2);

        cart.change_count(5, -1);
        assert_eq!(cart.count_of(5), 1);
        cart.change_count(5, -1);
        assert!(cart.is_empty());
        // no-op, no negative count
        cart.change_count(5, -1);
        assert!(cart.is_empty());
        assert_eq!(cart.count_of(5), 0);
    }

    #[test]
    fn extreme_deltas_clamp() {
        let mut cart = Cart::new();
        cart.add(&dish(5, 300.0), 2);

        let action: CallbackAction = "cnt:5:9223372036854775807".parse().unwrap();
        let CallbackAction::ChangeCount { id, delta } = action else {
            panic!("unexpected {:?}", action);
        };
        cart.change_count(id, delta);
        assert_eq!(cart.count_of(5), u32::MAX);

        cart.change_count(5, i64::MIN);
        assert!(cart.is_empty());
    }

    #[test]
    fn adding_twice_increments() {
        let mut cart = Cart::new();
        cart.add(&dish(1, 100.0), 0);
        cart.add(&dish(1, 100.0), 1);
        cart.add(&dish(2, 50.0), 3);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.count_of(1), 2);
        assert_eq!(cart.total_count(), 5);
        assert_eq!(cart.total_price(), 350.0);
    }

    #[test]
    fn large_negative_delta_clamps() {
        let mut cart = Cart::new();
        cart.add(&dish(1, 100.0), 3);
        cart.change_count(1, -100);
        assert!(cart.is_empty());
    }

    #[test]
    fn counts_never_negative_under_mixed_operations() {
        let mut cart = Cart::new();
        let deltas = [1, -3, 2, 5, -1, -10, 4, -2, 0, 7, -7];
        for (step, delta) in deltas.iter().enumerate() {
            let id = (step % 3) as u64;
            if step % 2 == 0 {
                cart.add(&dish(id, 10.0), 1);
            }
            cart.change_count(id, *delta);
            assert!(cart.items().iter().all(|item| item.count > 0));
        }
    }

    #[test]
    fn persisted_shape_is_dish_plus_count() {
        let mut cart = Cart::new();
        cart.add(&dish(5, 300.0), 1);
        let json: serde_json::Value = serde_json::from_str(&cart.to_json().unwrap()).unwrap();

        assert_eq!(json[0]["id"], 5);
        assert_eq!(json[0]["count"], 1);
        assert_eq!(json[0]["volume_weight_display"], "250 г");
    }

    #[test]
    fn persistent_cart_reloads_same_items() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        {
            let mut cart = PersistentCart::load(storage.clone());
            cart.add(&dish(1, 100.0), 2);
            cart.add(&dish(2, 50.0), 1);
            cart.change_count(2, 4);
        }

        let reloaded = PersistentCart::load(storage.clone());
        let pairs: Vec<(u64, u32)> = reloaded
            .cart()
            .items()
            .iter()
            .map(|item| (item.id(), item.count))
            .collect();
        assert_eq!(pairs, vec![(1, 2), (2, 5)]);
    }

    #[test]
    fn corrupt_storage_loads_empty() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        storage.set_item(CART_STORAGE_KEY, "{not json").unwrap();

        let cart = PersistentCart::load(storage);
        assert!(cart.cart().is_empty());
    }
}
