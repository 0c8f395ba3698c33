use serde::{Deserialize, Serialize};

use super::menu_data_types::number_or_string;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Ожидает",
            OrderStatus::Confirmed => "Подтверждён",
            OrderStatus::Completed => "Выполнен",
            OrderStatus::Cancelled => "Отменён",
            OrderStatus::Unknown => "—",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderLine {
    #[serde(alias = "dish_id")]
    pub menu_item_id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: u32,
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u64,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(deserialize_with = "number_or_string")]
    pub total_amount: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
}

pub type FulfillmentMode = OrderType;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub restaurant_id: u64,
    pub order_type: OrderType,
    pub table_number: Option<u32>,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_does_not_fail_the_order_list() {
        let order: Order = serde_json::from_str(
            r#"{"id": 3, "status": "refunded", "total_amount": "900.00", "items": []}"#,
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert_eq!(order.total_amount, 900.0);
    }

    #[test]
    fn order_type_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderType::DineIn).unwrap(),
            r#""dine_in""#
        );
    }
}
