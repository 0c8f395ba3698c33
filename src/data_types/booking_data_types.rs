use std::{collections::BTreeMap, fmt};

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::constants::{SLOT_FIRST_START_HOUR, SLOT_LAST_START_HOUR, SLOT_LENGTH_HOURS};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Table {
    pub id: u64,
    pub number: u32,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// one entry of `/reservations/tables/slot-availability`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TableAvailability {
    pub id: u64,
    pub number: u32,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// one entry of `/reservations/tables/{id}/slots`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TableSlot {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub table: Option<Table>,
}

impl TableSlot {
    pub fn label(&self) -> String {
        format!("{} – {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// 11:00 – 13:00, 12:00 – 14:00, ... 21:00 – 23:00
    pub fn fixed_slots() -> Vec<TimeSlot> {
        (SLOT_FIRST_START_HOUR..=SLOT_LAST_START_HOUR)
            .filter_map(|hour| {
                Some(TimeSlot {
                    start: NaiveTime::from_hms_opt(hour, 0, 0)?,
                    end: NaiveTime::from_hms_opt(hour + SLOT_LENGTH_HOURS, 0, 0)?,
                })
            })
            .collect()
    }

    pub fn start_str(&self) -> String {
        hh_mm(self.start)
    }

    pub fn end_str(&self) -> String {
        hh_mm(self.end)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} – {}", self.start_str(), self.end_str())
    }
}

fn hh_mm(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReservationRequest {
    pub restaurant_id: u64,
    pub table_id: u64,
    pub reservation_time: String,
    pub duration: u32,
    pub guest_count: u32,
    pub contact_name: String,
    pub contact_phone: String,
    pub special_requests: Option<String>,
    pub is_recurring: bool,
    pub recurring_pattern: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Reservation {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub table_id: Option<u64>,
    #[serde(default)]
    pub reservation_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BookingField {
    Name,
    Guests,
    Phone,
    Wishes,
    Slot,
}

impl BookingField {
    pub fn key(&self) -> &'static str {
        match self {
            BookingField::Name => "name",
            BookingField::Guests => "guests",
            BookingField::Phone => "phone",
            BookingField::Wishes => "wishes",
            BookingField::Slot => "slot",
        }
    }

    pub fn from_key(key: &str) -> Option<BookingField> {
        [
            BookingField::Name,
            BookingField::Guests,
            BookingField::Phone,
            BookingField::Wishes,
            BookingField::Slot,
        ]
        .into_iter()
        .find(|f| f.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingField::Name => "Имя",
            BookingField::Guests => "Гостей",
            BookingField::Phone => "Телефон",
            BookingField::Wishes => "Пожелания",
            BookingField::Slot => "Время",
        }
    }
}

/// one message per violated field
pub type FormErrors = BTreeMap<BookingField, &'static str>;

/// `reservation_time` as the backend expects it: `2025-05-24T19:00:00Z`
pub fn reservation_time(date: NaiveDate, start: &str) -> String {
    format!("{}T{}:00Z", date.format("%Y-%m-%d"), start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleven_fixed_slots() {
        let slots = TimeSlot::fixed_slots();
        assert_eq!(slots.len(), 11);
        assert_eq!(slots[0].to_string(), "11:00 – 13:00");
        assert_eq!(slots[10].to_string(), "21:00 – 23:00");
    }

    #[test]
    fn reservation_time_uses_selected_date() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 24).unwrap();
        assert_eq!(reservation_time(date, "19:00"), "2025-05-24T19:00:00Z");
    }
}
