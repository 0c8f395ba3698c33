use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    cache::ExpiringCache,
    calendar::CalendarView,
    constants::{AVAILABILITY_TTL, RESERVATION_DURATION_MIN, TABLE_NUMBERS},
    data_backend::{booking_api, ApiClient},
    data_types::{
        booking_data_types::{
            reservation_time, BookingField, FormErrors, Reservation, ReservationRequest,
            TableAvailability, TableSlot, TimeSlot,
        },
        profile_data_types::UserProfile,
    },
    errors::BookingError,
    sheet::Sheet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvailabilityKey {
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

/// Response caches of the booking screen. Table slots are always fetched fresh.
pub struct BookingCaches {
    availability: ExpiringCache<AvailabilityKey, Vec<TableAvailability>>,
}

impl Default for BookingCaches {
    fn default() -> Self {
        BookingCaches {
            availability: ExpiringCache::new(AVAILABILITY_TTL),
        }
    }
}

impl BookingCaches {
    pub fn availability(&self) -> &ExpiringCache<AvailabilityKey, Vec<TableAvailability>> {
        &self.availability
    }

    pub fn invalidate_availability(&self, date: NaiveDate) -> usize {
        self.availability.invalidate(|key| key.date == date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Available,
    Booked,
    /// not part of the availability answer (yet)
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub name: String,
    pub guests: String,
    pub phone: String,
    pub wishes: String,
}

impl BookingForm {
    pub fn get(&self, field: BookingField) -> &str {
        match field {
            BookingField::Name => &self.name,
            BookingField::Guests => &self.guests,
            BookingField::Phone => &self.phone,
            BookingField::Wishes => &self.wishes,
            BookingField::Slot => "",
        }
    }

    fn set(&mut self, field: BookingField, value: String) -> bool {
        match field {
            BookingField::Name => self.name = value,
            BookingField::Guests => self.guests = value,
            BookingField::Phone => self.phone = value,
            BookingField::Wishes => self.wishes = value,
            BookingField::Slot => return false,
        }
        true
    }

    fn guest_count(&self) -> Option<u32> {
        self.guests.trim().parse::<u32>().ok().filter(|n| *n > 0)
    }
}

/// Booking screen: date and slot selection, the seating chart, the table
/// sheet and the reservation details sheet.
pub struct BookingScreen {
    restaurant_id: u64,
    today: NaiveDate,
    date: NaiveDate,
    calendar: Option<CalendarView>,
    slots: Vec<TimeSlot>,
    active_slot: usize,
    availability: Arc<Vec<TableAvailability>>,
    availability_error: bool,

    table_sheet: Sheet,
    table: Option<TableAvailability>,
    table_slots: Arc<Vec<TableSlot>>,
    table_slots_error: bool,

    details_sheet: Sheet,
    form: BookingForm,
    selected_slot: Option<usize>,
    errors: FormErrors,
    submitting: bool,

    caches: BookingCaches,
}

impl BookingScreen {
    pub fn new(restaurant_id: u64, today: NaiveDate) -> Self {
        BookingScreen {
            restaurant_id,
            today,
            date: today,
            calendar: None,
            slots: TimeSlot::fixed_slots(),
            active_slot: 0,
            availability: Arc::default(),
            availability_error: false,
            table_sheet: Sheet::new(),
            table: None,
            table_slots: Arc::default(),
            table_slots_error: false,
            details_sheet: Sheet::new(),
            form: BookingForm::default(),
            selected_slot: None,
            errors: FormErrors::new(),
            submitting: false,
            caches: BookingCaches::default(),
        }
    }

    pub fn caches(&self) -> &BookingCaches {
        &self.caches
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    pub fn active_time_slot(&self) -> TimeSlot {
        self.slots[self.active_slot.min(self.slots.len() - 1)]
    }

    pub fn availability(&self) -> &[TableAvailability] {
        &self.availability
    }

    pub fn availability_failed(&self) -> bool {
        self.availability_error
    }

    // calendar popup

    pub fn calendar(&self) -> Option<&CalendarView> {
        self.calendar.as_ref()
    }

    pub fn open_calendar(&mut self) {
        self.calendar = Some(CalendarView::new(self.date, self.today));
    }

    pub fn close_calendar(&mut self) {
        self.calendar = None;
    }

    pub fn calendar_prev(&mut self) -> bool {
        self.calendar.as_mut().is_some_and(CalendarView::previous_month)
    }

    pub fn calendar_next(&mut self) -> bool {
        self.calendar.as_mut().is_some_and(CalendarView::next_month)
    }

    /// Past days are refused. A new day closes the popup and reloads the chart.
    pub async fn pick_date(&mut self, api: &ApiClient, date: NaiveDate) -> bool {
        if date < self.today {
            log::debug!("Refusing past date {}", date);
            return false;
        }
        self.calendar = None;
        if date != self.date {
            self.date = date;
            self.load_availability(api, false).await;
        }
        true
    }

    pub async fn set_active_slot(&mut self, api: &ApiClient, index: usize) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        self.active_slot = index;
        self.load_availability(api, false).await;
        true
    }

    /// Availability of every table for the active slot. `bypass_cache` still
    /// stores the fresh answer.
    pub async fn load_availability(&mut self, api: &ApiClient, bypass_cache: bool) {
        let key = AvailabilityKey {
            date: self.date,
            slot: self.active_time_slot(),
        };
        let restaurant_id = self.restaurant_id;
        let fetcher = || async move {
            booking_api::get_slot_availability(api, restaurant_id, key.date, &key.slot).await
        };

        let result = if bypass_cache {
            self.caches.availability.refresh(key, fetcher).await
        } else {
            self.caches.availability.get_or_fetch(key, fetcher).await
        };

        match result {
            Ok(tables) => {
                self.availability = tables;
                self.availability_error = false;
            }
            Err(e) => {
                log::error!("Error fetching tables availability: {}", e);
                self.availability_error = true;
            }
        }
    }

    pub fn table_status(&self, number: u32) -> TableStatus {
        match self.availability.iter().find(|t| t.number == number) {
            Some(table) if table.is_available => TableStatus::Available,
            Some(_) => TableStatus::Booked,
            None => TableStatus::Unknown,
        }
    }

    /// the seating chart, tables 1 to 12
    pub fn seating_chart(&self) -> Vec<(u32, TableStatus)> {
        TABLE_NUMBERS
            .map(|number| (number, self.table_status(number)))
            .collect()
    }

    // table sheet

    pub fn table_sheet(&self) -> &Sheet {
        &self.table_sheet
    }

    pub fn table(&self) -> Option<&TableAvailability> {
        self.table.as_ref()
    }

    pub fn table_slots(&self) -> &[TableSlot] {
        &self.table_slots
    }

    pub fn table_slots_failed(&self) -> bool {
        self.table_slots_error
    }

    /// Only available tables open. Loads the table's slots for the day.
    pub async fn open_table(&mut self, api: &ApiClient, table_id: u64) -> bool {
        let Some(table) = self
            .availability
            .iter()
            .find(|t| t.id == table_id && t.is_available)
            .cloned()
        else {
            log::debug!("Table {} is not available at {}", table_id, self.active_time_slot());
            return false;
        };

        self.table = Some(table);
        self.table_sheet.open_now();
        self.load_table_slots(api, table_id).await;
        true
    }

    async fn load_table_slots(&mut self, api: &ApiClient, table_id: u64) {
        match booking_api::get_table_slots(api, table_id, self.date).await {
            Ok(slots) => {
                self.table_slots = Arc::new(slots);
                self.table_slots_error = false;
            }
            Err(e) => {
                log::error!("Error fetching table slots: {}", e);
                self.table_slots = Arc::default();
                self.table_slots_error = true;
            }
        }
    }

    pub fn close_table(&mut self) {
        self.table_sheet.close_now();
        self.table = None;
    }

    /// "choose time": hands the table over to the details sheet
    pub fn choose_time(&mut self, profile: Option<&UserProfile>) -> bool {
        if self.table.is_none() {
            return false;
        }
        self.table_sheet.close_now();
        self.details_sheet.open_now();
        self.selected_slot = None;
        self.errors.clear();
        if let Some(profile) = profile {
            self.prefill(profile);
        }
        true
    }

    // details sheet

    pub fn details_sheet(&self) -> &Sheet {
        &self.details_sheet
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// name and phone from the user profile, when it has them
    pub fn prefill(&mut self, profile: &UserProfile) {
        if let Some(name) = profile.full_name() {
            self.form.name = name;
        }
        if let Some(phone) = profile.phone_number.as_deref().filter(|p| !p.is_empty()) {
            self.form.phone = phone.to_string();
        }
    }

    pub fn set_field(&mut self, field: BookingField, value: impl Into<String>) -> bool {
        self.form.set(field, value.into())
    }

    pub fn selected_slot(&self) -> Option<&TableSlot> {
        self.selected_slot.and_then(|idx| self.table_slots.get(idx))
    }

    /// selecting the selected slot again unselects it, booked slots are ignored
    pub fn toggle_slot(&mut self, index: usize) -> bool {
        match self.table_slots.get(index) {
            Some(slot) if slot.is_available => {
                self.selected_slot = if self.selected_slot == Some(index) {
                    None
                } else {
                    Some(index)
                };
                true
            }
            _ => false,
        }
    }

    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.form.name.trim().is_empty() {
            errors.insert(BookingField::Name, "Имя обязательно");
        }
        if self.form.phone.trim().is_empty() {
            errors.insert(BookingField::Phone, "Телефон обязателен");
        }
        if self.form.guest_count().is_none() {
            errors.insert(
                BookingField::Guests,
                "Количество гостей обязательно и должно быть больше 0",
            );
        }
        if self.selected_slot().is_none() {
            errors.insert(BookingField::Slot, "Выберите время");
        }
        errors
    }

    /// Validates and builds the reservation payload, nothing touches the network.
    pub fn build_request(&self) -> Result<ReservationRequest, BookingError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(BookingError::Invalid(errors));
        }

        let table = self.table.as_ref().ok_or(BookingError::MissingTable)?;
        let (Some(slot), Some(guest_count)) = (self.selected_slot(), self.form.guest_count())
        else {
            return Err(BookingError::Invalid(self.validate()));
        };

        let wishes = self.form.wishes.trim();
        Ok(ReservationRequest {
            restaurant_id: self.restaurant_id,
            table_id: table.id,
            reservation_time: reservation_time(self.date, &slot.start),
            duration: RESERVATION_DURATION_MIN,
            guest_count,
            contact_name: self.form.name.trim().to_string(),
            contact_phone: self.form.phone.trim().to_string(),
            special_requests: (!wishes.is_empty()).then(|| wishes.to_string()),
            is_recurring: false,
            recurring_pattern: None,
        })
    }

    /// On success the details sheet closes, the day's cached availability is
    /// dropped and the chart is refetched past the cache.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<Reservation, BookingError> {
        let request = match self.build_request() {
            Ok(request) => request,
            Err(BookingError::Invalid(errors)) => {
                log::debug!("Booking form invalid: {:?}", errors);
                self.errors = errors.clone();
                return Err(BookingError::Invalid(errors));
            }
            Err(e) => return Err(e),
        };
        self.errors.clear();

        self.submitting = true;
        let result = booking_api::create_reservation(api, &request).await;
        self.submitting = false;

        let reservation = result.map_err(|e| {
            log::error!("Booking failed: {}", e);
            BookingError::Api(e)
        })?;
        log::info!(
            "Table {} booked for {}",
            request.table_id,
            request.reservation_time
        );

        self.reset_details();
        let dropped = self.caches.invalidate_availability(self.date);
        log::debug!("Dropped {} cached entries for {}", dropped, self.date);
        self.load_availability(api, true).await;

        Ok(reservation)
    }

    /// Closing the details sheet forgets the day's availability.
    pub async fn close_details(&mut self, api: &ApiClient) {
        self.reset_details();
        self.caches.invalidate_availability(self.date);
        self.load_availability(api, false).await;
    }

    fn reset_details(&mut self) {
        self.details_sheet.close_now();
        self.table = None;
        self.selected_slot = None;
        self.errors.clear();
        self.form.wishes.clear();
        self.form.guests.clear();
    }
}
