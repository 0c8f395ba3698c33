use crate::{
    app_state::AppState,
    cache::ExpiringCache,
    cart::Cart,
    data_backend::order_api,
    data_types::order_data_types::{
        FulfillmentMode, Order, OrderLine, OrderRequest, OrderType,
    },
    errors::OrderError,
    router::Tab,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum OrderPhase {
    #[default]
    Editing,
    Submitting,
    /// transient confirmation, leads back to the menu
    Confirmed(Option<Order>),
    Failed(String),
}

/// Checkout of the cart: fulfilment mode, table number and submission.
#[derive(Debug, Clone)]
pub struct OrderScreen {
    mode: FulfillmentMode,
    table_number: String,
    phase: OrderPhase,
}

impl Default for OrderScreen {
    fn default() -> Self {
        OrderScreen {
            mode: OrderType::DineIn,
            table_number: String::new(),
            phase: OrderPhase::Editing,
        }
    }
}

impl OrderScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> FulfillmentMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: FulfillmentMode) {
        self.mode = mode;
    }

    pub fn table_number(&self) -> &str {
        &self.table_number
    }

    pub fn set_table_number(&mut self, value: impl Into<String>) {
        self.table_number = value.into().trim().to_string();
    }

    pub fn phase(&self) -> &OrderPhase {
        &self.phase
    }

    pub fn build_request(&self, cart: &Cart, restaurant_id: u64) -> Result<OrderRequest, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let table_number = match self.mode {
            OrderType::DineIn => Some(
                self.table_number
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(OrderError::MissingTableNumber)?,
            ),
            OrderType::Takeaway => None,
        };

        let items = cart
            .items()
            .iter()
            .map(|item| OrderLine {
                menu_item_id: item.id(),
                name: Some(item.dish.name.clone()),
                quantity: item.count,
                price: item.dish.price,
            })
            .collect();

        Ok(OrderRequest {
            restaurant_id,
            order_type: self.mode,
            table_number,
            items,
            total_amount: cart.total_price(),
        })
    }

    /// Posts the cart. Success clears it and drops the cached order history,
    /// failure leaves the cart as it was.
    pub async fn submit(
        &mut self,
        state: &mut AppState,
        history: &ExpiringCache<(), Vec<Order>>,
    ) -> Result<Option<Order>, OrderError> {
        let request = self.build_request(state.cart(), state.restaurant_id())?;

        self.phase = OrderPhase::Submitting;
        match order_api::create_order(state.api(), &request).await {
            Ok(order) => {
                log::info!(
                    "Order placed: {} items, total {}",
                    request.items.len(),
                    request.total_amount
                );
                state.clear_cart();
                history.clear();
                self.table_number.clear();
                self.phase = OrderPhase::Confirmed(order.clone());
                Ok(order)
            }
            Err(e) => {
                log::error!("Order failed: {}", e);
                self.phase = OrderPhase::Failed(e.to_string());
                Err(OrderError::Api(e))
            }
        }
    }

    /// leaves the confirmation, returns where to navigate
    pub fn finish(&mut self) -> Tab {
        self.phase = OrderPhase::Editing;
        Tab::Menu
    }
}
