use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    app_state::AppState,
    booking::BookingScreen,
    data_backend::ApiClient,
    data_types::{CallbackAction, InputField},
    db_operations::LocalStorage,
    errors::{BookingError, OrderError},
    host::HostBridge,
    menu::MenuScreen,
    orders::OrderScreen,
    profile::{ProfileScreen, ProfileSection},
    router::{Router, Tab, TabChange},
};

/// what the surface should do after an action was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Render,
    AskInput(InputField),
}

/// One running Mini-App: host bridge, router, shared state and the screens.
pub struct MiniApp {
    host: HostBridge,
    router: Router,
    state: AppState,
    menu: MenuScreen,
    booking: BookingScreen,
    order: OrderScreen,
    profile: ProfileScreen,
}

impl MiniApp {
    pub fn new(
        api: ApiClient,
        restaurant_id: u64,
        storage: Arc<dyn LocalStorage>,
        today: NaiveDate,
    ) -> Self {
        let host = HostBridge::new(api.init_data());
        let profile = ProfileScreen::new(host.user().cloned());

        MiniApp {
            host,
            router: Router::new(),
            state: AppState::new(api, restaurant_id, storage),
            menu: MenuScreen::new(),
            booking: BookingScreen::new(restaurant_id, today),
            order: OrderScreen::new(),
            profile,
        }
    }

    pub fn host(&self) -> &HostBridge {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut HostBridge {
        &mut self.host
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn menu(&self) -> &MenuScreen {
        &self.menu
    }

    pub fn booking(&self) -> &BookingScreen {
        &self.booking
    }

    pub fn order(&self) -> &OrderScreen {
        &self.order
    }

    pub fn profile(&self) -> &ProfileScreen {
        &self.profile
    }

    pub fn current_tab(&self) -> Tab {
        self.router.current()
    }

    /// without an init payload the backend would refuse every call
    pub fn is_authenticated(&self) -> bool {
        self.host.has_init_data()
    }

    /// Swaps in a freshly signed payload. An empty one never logs the app out.
    pub fn renew_init_data(&mut self, init_data: &str) {
        if init_data.is_empty() {
            return;
        }
        self.host.set_init_data(init_data);
        self.state.set_init_data(init_data);
    }

    pub async fn launch(&mut self) {
        self.host.ready();
        if self.is_authenticated() {
            self.state.load_all().await;
        } else {
            log::warn!("Launched without init data");
        }
        self.sync_back_button();
    }

    pub async fn navigate(&mut self, tab: Tab) {
        let change = self.router.set_tab(tab);
        self.entered(change).await;
    }

    pub async fn back(&mut self) {
        let change = self.router.back();
        self.entered(change).await;
    }

    async fn entered(&mut self, change: TabChange) {
        log::debug!("{} -> {}", change.from, change.to);
        self.profile.on_tab_change(change);
        self.sync_back_button();

        if !self.is_authenticated() {
            return;
        }
        match change.to {
            Tab::Home => self.state.load_all().await,
            Tab::Menu => {
                self.state.load_categories().await;
                self.state.load_dishes().await;
            }
            Tab::Booking => self.booking.load_availability(self.state.api(), false).await,
            Tab::Profile | Tab::Cart | Tab::Order => {}
        }
    }

    fn sync_back_button(&mut self) {
        self.host.set_back_button(self.router.back_button_visible());
    }

    /// Refetches shared data and the current screen, skipping every cache.
    pub async fn refresh(&mut self) {
        self.state.refresh_all().await;
        match self.router.current() {
            Tab::Booking => self.booking.load_availability(self.state.api(), true).await,
            Tab::Profile => {
                self.profile.caches().profile().clear();
                self.profile.caches().achievements().clear();
                self.profile.caches().orders().clear();
                let section = self.profile.section();
                self.profile.open_section(self.state.api(), section).await;
            }
            _ => {}
        }
    }

    pub async fn apply(&mut self, action: CallbackAction) -> Outcome {
        let api = self.state.api().clone();

        match action {
            CallbackAction::Tab(tab) => self.navigate(tab).await,
            CallbackAction::Back => self.back().await,
            CallbackAction::Refresh => self.refresh().await,
            CallbackAction::Close => self.host.close(),

            CallbackAction::MenuKind(kind) => self.menu.set_kind(kind),
            CallbackAction::Category(id) => {
                self.menu.select_category(&self.state, id);
            }
            CallbackAction::AddToCart(id) => {
                if !self.state.add_to_cart_by_id(id) {
                    log::warn!("Dish {} is unknown, not added", id);
                }
            }
            CallbackAction::ChangeCount { id, delta } => {
                self.state.change_cart_item_count(id, delta)
            }
            CallbackAction::RemoveFromCart(id) => self.state.remove_from_cart(id),
            CallbackAction::ClearCart => self.state.clear_cart(),

            CallbackAction::OpenCalendar => self.booking.open_calendar(),
            CallbackAction::CalendarPrev => {
                self.booking.calendar_prev();
            }
            CallbackAction::CalendarNext => {
                self.booking.calendar_next();
            }
            CallbackAction::CloseCalendar => self.booking.close_calendar(),
            CallbackAction::PickDate(date) => {
                self.booking.pick_date(&api, date).await;
            }
            CallbackAction::ActiveSlot(index) => {
                self.booking.set_active_slot(&api, index).await;
            }
            CallbackAction::OpenTable(id) => {
                if !self.booking.open_table(&api, id).await {
                    self.host
                        .show_popup("Бронирование", "Этот столик уже занят.");
                }
            }
            CallbackAction::CloseTable => self.booking.close_table(),
            CallbackAction::ChooseTime => {
                self.profile.load_profile(&api).await;
                self.booking.choose_time(self.profile.profile());
            }
            CallbackAction::ToggleBookingSlot(index) => {
                self.booking.toggle_slot(index);
            }
            CallbackAction::EditBooking(field) => {
                return Outcome::AskInput(InputField::Booking(field))
            }
            CallbackAction::SubmitBooking => self.submit_booking(&api).await,
            CallbackAction::CloseBooking => self.booking.close_details(&api).await,

            CallbackAction::Fulfillment(mode) => self.order.set_mode(mode),
            CallbackAction::EditTableNumber => return Outcome::AskInput(InputField::TableNumber),
            CallbackAction::SubmitOrder => self.submit_order().await,
            CallbackAction::FinishOrder => {
                let tab = self.order.finish();
                self.navigate(tab).await;
            }

            CallbackAction::ProfileSection(ProfileSection::Main) => self.profile.close_section(),
            CallbackAction::ProfileSection(section) => {
                self.profile.open_section(&api, section).await
            }
            CallbackAction::EditProfile => self.profile.open_edit(&api).await,
            CallbackAction::EditProfileField(field) => {
                return Outcome::AskInput(InputField::Profile(field))
            }
            CallbackAction::SaveProfile => {
                // the save state carries the failure
                let _ = self.profile.save(&api).await;
            }
            CallbackAction::CloseProfileEdit => self.profile.close_edit(),
        }

        Outcome::Render
    }

    /// free text typed for a field the app asked for
    pub fn apply_input(&mut self, field: InputField, text: &str) {
        match field {
            InputField::Booking(field) => {
                self.booking.set_field(field, text);
            }
            InputField::TableNumber => self.order.set_table_number(text),
            InputField::Profile(field) => self.profile.set_field(field, text),
        }
    }

    async fn submit_booking(&mut self, api: &ApiClient) {
        match self.booking.submit(api).await {
            Ok(_) => self
                .host
                .show_popup("Бронирование", "Столик забронирован. Ждём вас!"),
            // shown next to the fields
            Err(BookingError::Invalid(_)) => {}
            Err(e) => self.host.show_popup("Ошибка бронирования", e.to_string()),
        }
    }

    async fn submit_order(&mut self) {
        let history = self.profile.caches().orders();
        if let Err(e) = self.order.submit(&mut self.state, history).await {
            let message = match e {
                OrderError::Api(_) => "Не удалось оформить заказ. Попробуйте ещё раз.".to_string(),
                other => other.to_string(),
            };
            self.host.show_popup("Ошибка", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db_operations::MemoryStorage, host::HostEvent};

    fn app() -> MiniApp {
        MiniApp::new(
            ApiClient::new("http://127.0.0.1:9", ""),
            1,
            Arc::new(MemoryStorage::new()),
            NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
        )
    }

    #[tokio::test]
    async fn back_control_follows_cart_and_order() {
        let mut app = app();
        app.launch().await;
        assert!(!app.is_authenticated());

        app.navigate(Tab::Order).await;
        assert!(app.host().back_button_visible());
        app.back().await;
        assert_eq!(app.current_tab(), Tab::Cart);
        app.back().await;
        assert_eq!(app.current_tab(), Tab::Menu);
        assert!(!app.host().back_button_visible());

        let events = app.host_mut().drain_events();
        assert_eq!(events[0], HostEvent::Expand);
        assert!(events.contains(&HostEvent::BackButton(true)));
        assert_eq!(events.last(), Some(&HostEvent::BackButton(false)));
    }

    #[tokio::test]
    async fn empty_cart_order_is_refused_with_popup() {
        let mut app = app();
        app.navigate(Tab::Order).await;
        app.host_mut().drain_events();

        assert_eq!(app.apply(CallbackAction::SubmitOrder).await, Outcome::Render);
        assert_eq!(
            app.host_mut().drain_events(),
            vec![HostEvent::Popup {
                title: "Ошибка".into(),
                message: "Корзина пуста".into()
            }]
        );
    }

    #[tokio::test]
    async fn text_fields_ask_for_input() {
        let mut app = app();
        assert_eq!(
            app.apply(CallbackAction::EditTableNumber).await,
            Outcome::AskInput(InputField::TableNumber)
        );
        app.apply_input(InputField::TableNumber, " 5 ");
        assert_eq!(app.order().table_number(), "5");
    }
}
