use chrono::{Datelike, Months, NaiveDate};

const MONTHS_RU: [&str; 12] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

pub const WEEKDAYS_RU: [&str; 7] = ["ПН", "ВТ", "СР", "ЧТ", "ПТ", "СБ", "ВС"];

/// Month popup of the booking screen. Weeks start on Monday.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView {
    month: NaiveDate,
    today: NaiveDate,
}

impl CalendarView {
    pub fn new(selected: NaiveDate, today: NaiveDate) -> Self {
        CalendarView {
            month: first_of_month(selected.max(today)),
            today,
        }
    }

    /// first day of the displayed month
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn title(&self) -> String {
        format!("{} {}", MONTHS_RU[self.month.month0() as usize], self.month.year())
    }

    pub fn can_go_back(&self) -> bool {
        self.month > first_of_month(self.today)
    }

    /// no paging into months before the current one
    pub fn previous_month(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        match self.month.checked_sub_months(Months::new(1)) {
            Some(prev) => {
                self.month = prev;
                true
            }
            None => false,
        }
    }

    pub fn next_month(&mut self) -> bool {
        match self.month.checked_add_months(Months::new(1)) {
            Some(next) => {
                self.month = next;
                true
            }
            None => false,
        }
    }

    /// grid cells row by row, `None` pads the days before the 1st
    pub fn days(&self) -> Vec<Option<NaiveDate>> {
        let leading = self.month.weekday().num_days_from_monday() as usize;
        let mut cells = vec![None; leading];
        cells.extend(
            self.month
                .iter_days()
                .take_while(|d| d.month() == self.month.month())
                .map(Some),
        );
        cells
    }

    pub fn weeks(&self) -> Vec<[Option<NaiveDate>; 7]> {
        self.days()
            .chunks(7)
            .map(|chunk| {
                let mut week = [None; 7];
                week[..chunk.len()].copy_from_slice(chunk);
                week
            })
            .collect()
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        date >= self.today
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        date.weekday().num_days_from_monday() >= 5
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
