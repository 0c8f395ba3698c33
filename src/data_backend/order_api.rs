use serde_json::Value;

use crate::data_types::order_data_types::{Order, OrderRequest};
use crate::errors::ApiError;

use super::{list_or_empty, ApiClient, NO_PARAMS};

pub async fn get_orders(api: &ApiClient) -> Result<Vec<Order>, ApiError> {
    let data = api.get("/orders", NO_PARAMS).await?;
    list_or_empty("/orders", data)
}

/// The order is placed once the backend answers 2xx; the echoed order is
/// informational and may be missing.
pub async fn create_order(api: &ApiClient, request: &OrderRequest) -> Result<Option<Order>, ApiError> {
    let data = api.post("/orders", request).await?;
    if data == Value::Null {
        return Ok(None);
    }

    match serde_json::from_value(data) {
        Ok(order) => Ok(Some(order)),
        Err(e) => {
            log::warn!("/orders returned an unexpected body: {}", e);
            Ok(None)
        }
    }
}
