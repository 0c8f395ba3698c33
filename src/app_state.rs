use std::sync::Arc;

use crate::{
    cart::{Cart, PersistentCart},
    data_backend::{menu_api, profile_api, ApiClient},
    data_types::{
        menu_data_types::{Category, Dish},
        profile_data_types::Achievement,
    },
    db_operations::LocalStorage,
    errors::ApiError,
};

/// A list fetched from the backend together with its loading/error flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCollection<T> {
    items: Vec<T>,
    loading: bool,
    error: bool,
}

impl<T> Default for RemoteCollection<T> {
    // nothing fetched yet counts as loading
    fn default() -> Self {
        RemoteCollection {
            items: Vec::new(),
            loading: true,
            error: false,
        }
    }
}

impl<T> RemoteCollection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = false;
    }

    /// Failures keep the previous items and only raise the flag.
    pub fn resolve(&mut self, what: &str, result: Result<Vec<T>, ApiError>) {
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = false;
            }
            Err(e) => {
                log::error!("Loading {} failed: {}", what, e);
                self.error = true;
            }
        }
    }
}

/// State shared by all screens of one Mini-App: menu data, the featured
/// achievement and the cart. Mutated only through these methods.
pub struct AppState {
    api: ApiClient,
    restaurant_id: u64,
    categories: RemoteCollection<Category>,
    dishes: RemoteCollection<Dish>,
    novelty: RemoteCollection<Dish>,
    achievement: RemoteCollection<Achievement>,
    cart: PersistentCart,
}

impl AppState {
    pub fn new(api: ApiClient, restaurant_id: u64, storage: Arc<dyn LocalStorage>) -> Self {
        AppState {
            api,
            restaurant_id,
            categories: RemoteCollection::default(),
            dishes: RemoteCollection::default(),
            novelty: RemoteCollection::default(),
            achievement: RemoteCollection::default(),
            cart: PersistentCart::load(storage),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn set_init_data(&mut self, init_data: &str) {
        self.api.set_init_data(init_data);
    }

    pub fn restaurant_id(&self) -> u64 {
        self.restaurant_id
    }

    pub fn categories(&self) -> &RemoteCollection<Category> {
        &self.categories
    }

    pub fn dishes(&self) -> &RemoteCollection<Dish> {
        &self.dishes
    }

    pub fn novelty(&self) -> &RemoteCollection<Dish> {
        &self.novelty
    }

    /// the first achievement the backend lists, shown on the home screen
    pub fn achievement(&self) -> Option<&Achievement> {
        self.achievement.items().first()
    }

    pub fn achievement_state(&self) -> &RemoteCollection<Achievement> {
        &self.achievement
    }

    pub fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    pub fn dish(&self, id: u64) -> Option<&Dish> {
        self.dishes
            .items()
            .iter()
            .chain(self.novelty.items())
            .find(|dish| dish.id == id)
    }

    /// visible (non archived) categories
    pub fn visible_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.items().iter().filter(|c| !c.is_archived)
    }

    pub fn dishes_in_category(&self, category_id: u64) -> Vec<&Dish> {
        self.dishes
            .items()
            .iter()
            .filter(|d| !d.is_archived && d.category_id == Some(category_id))
            .collect()
    }

    pub async fn load_categories(&mut self) {
        if !self.categories.is_empty() {
            return;
        }
        self.fetch_categories().await;
    }

    async fn fetch_categories(&mut self) {
        self.categories.begin();
        let result = menu_api::get_categories(&self.api, self.restaurant_id).await;
        self.categories.resolve("categories", result);
    }

    pub async fn load_dishes(&mut self) {
        if !self.dishes.is_empty() {
            return;
        }
        self.fetch_dishes().await;
    }

    async fn fetch_dishes(&mut self) {
        self.dishes.begin();
        let result = menu_api::get_dishes(&self.api, self.restaurant_id, None).await;
        self.dishes.resolve("dishes", result);
    }

    /// Dishes of the category tagged "new", or of the last category if none is
    /// tagged. Needs categories to be loaded first.
    pub async fn load_novelty(&mut self) {
        if !self.novelty.is_empty() {
            return;
        }
        self.fetch_novelty().await;
    }

    async fn fetch_novelty(&mut self) {
        let Some(category_id) = self.novelty_category().map(|c| c.id) else {
            return;
        };

        self.novelty.begin();
        let result = menu_api::get_dishes(&self.api, self.restaurant_id, Some(category_id)).await;
        self.novelty.resolve("novelty dishes", result);
    }

    pub fn novelty_category(&self) -> Option<&Category> {
        self.visible_categories()
            .find(|c| c.has_type("new"))
            .or_else(|| self.visible_categories().last())
    }

    pub async fn load_achievement(&mut self) {
        if !self.achievement.is_empty() {
            return;
        }
        self.fetch_achievement().await;
    }

    async fn fetch_achievement(&mut self) {
        self.achievement.begin();
        let result = profile_api::get_achievements(&self.api).await;
        self.achievement.resolve("achievements", result);
    }

    pub async fn load_all(&mut self) {
        self.load_categories().await;
        self.load_dishes().await;
        self.load_achievement().await;
        self.load_novelty().await;
    }

    /// refetch everything regardless of what is loaded
    pub async fn refresh_all(&mut self) {
        self.fetch_categories().await;
        self.fetch_dishes().await;
        self.fetch_achievement().await;
        self.fetch_novelty().await;
    }

    pub fn add_to_cart(&mut self, dish: &Dish, quantity: u32) {
        self.cart.add(dish, quantity);
    }

    /// adds a dish known to the state by id, returns false if it is unknown
    pub fn add_to_cart_by_id(&mut self, id: u64) -> bool {
        match self.dish(id).cloned() {
            Some(dish) => {
                self.cart.add(&dish, 1);
                true
            }
            None => false,
        }
    }

    pub fn change_cart_item_count(&mut self, id: u64, delta: i64) {
        self.cart.change_count(id, delta);
    }

    pub fn remove_from_cart(&mut self, id: u64) {
        self.cart.remove(id);
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_collection_keeps_items_on_failure() {
        let mut coll: RemoteCollection<u32> = RemoteCollection::default();
        assert!(coll.is_loading());

        coll.resolve("numbers", Ok(vec![1, 2]));
        assert!(!coll.is_loading());
        assert_eq!(coll.items(), &[1, 2]);

        coll.begin();
        coll.resolve(
            "numbers",
            Err(ApiError::Http {
                status: 502,
                message: "bad gateway".into(),
            }),
        );
        assert!(coll.has_error());
        assert_eq!(coll.items(), &[1, 2]);
    }
}
