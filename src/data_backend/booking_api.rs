use chrono::NaiveDate;

use crate::data_types::booking_data_types::{
    Reservation, ReservationRequest, TableAvailability, TableSlot, TimeSlot,
};
use crate::errors::ApiError;

use super::{decode_or_default, list_or_empty, ApiClient};

/// availability of every table for one slot of one day
pub async fn get_slot_availability(
    api: &ApiClient,
    restaurant_id: u64,
    date: NaiveDate,
    slot: &TimeSlot,
) -> Result<Vec<TableAvailability>, ApiError> {
    let endpoint = "/reservations/tables/slot-availability";
    let params = [
        ("restaurant_id", restaurant_id.to_string()),
        ("date", date.format("%Y-%m-%d").to_string()),
        ("slot_start", slot.start_str()),
        ("slot_end", slot.end_str()),
    ];
    let data = api.get(endpoint, &params).await?;

    list_or_empty(endpoint, data)
}

pub async fn get_table_slots(
    api: &ApiClient,
    table_id: u64,
    date: NaiveDate,
) -> Result<Vec<TableSlot>, ApiError> {
    let endpoint = format!("/reservations/tables/{}/slots", table_id);
    let params = [("date", date.format("%Y-%m-%d").to_string())];
    let data = api.get(&endpoint, &params).await?;

    list_or_empty(&endpoint, data)
}

pub async fn create_reservation(
    api: &ApiClient,
    request: &ReservationRequest,
) -> Result<Reservation, ApiError> {
    let data = api.post("/reservations", request).await?;
    Ok(decode_or_default("/reservations", data))
}
