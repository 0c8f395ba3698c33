use crate::data_types::menu_data_types::{Category, Dish};
use crate::errors::ApiError;

use super::{list_or_empty, ApiClient};

pub async fn get_categories(api: &ApiClient, restaurant_id: u64) -> Result<Vec<Category>, ApiError> {
    let params = [("restaurant_id", restaurant_id.to_string())];
    let data = api.get("/menu/categories", &params).await?;

    list_or_empty("/menu/categories", data)
}

/// all dishes of the restaurant, or only those of one category
pub async fn get_dishes(
    api: &ApiClient,
    restaurant_id: u64,
    category_id: Option<u64>,
) -> Result<Vec<Dish>, ApiError> {
    let mut params = vec![("restaurant_id", restaurant_id.to_string())];
    if let Some(category_id) = category_id {
        params.push(("category_id", category_id.to_string()));
    }
    let data = api.get("/menu/items", &params).await?;

    list_or_empty("/menu/items", data)
}
