pub mod booking_data_types;
pub mod menu_data_types;
pub mod order_data_types;
pub mod profile_data_types;

use std::{fmt, str::FromStr};

use booking_data_types::BookingField;
use chrono::NaiveDate;
use order_data_types::OrderType;
use profile_data_types::ProfileField;
use teloxide::{
    dispatching::dialogue::InMemStorage, prelude::Dialogue, utils::command::BotCommands,
};

use crate::{menu::MenuKind, profile::ProfileSection, router::Tab};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Главная")]
    Start,
    #[command(description = "Меню")]
    Menu,
    #[command(description = "Забронировать столик")]
    Booking,
    #[command(description = "Профиль")]
    Profile,
    #[command(description = "Корзина\n")]
    Cart,
    #[command(hide)]
    Cancel,
}

impl Command {
    pub fn tab(&self) -> Option<Tab> {
        match self {
            Command::Start => Some(Tab::Home),
            Command::Menu => Some(Tab::Menu),
            Command::Booking => Some(Tab::Booking),
            Command::Profile => Some(Tab::Profile),
            Command::Cart => Some(Tab::Cart),
            Command::Cancel => None,
        }
    }
}

/// free text the chat is currently asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Booking(BookingField),
    TableNumber,
    Profile(ProfileField),
}

impl InputField {
    pub fn prompt(&self) -> String {
        match self {
            InputField::Booking(field) => format!("{}:", field.label()),
            InputField::TableNumber => "Номер столика:".to_string(),
            InputField::Profile(field) => format!("{}:", field.label()),
        }
    }
}

#[derive(Clone, Default)]
pub enum DialogueState {
    #[default]
    Default,
    AwaitInput(InputField),
}

pub type DialogueType = Dialogue<DialogueState, InMemStorage<DialogueState>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Inline keyboard payload, `cmd` or `cmd:arg` (telegram caps it at 64 bytes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallbackAction {
    Tab(Tab),
    Back,
    Refresh,
    Close,
    // menu / cart
    MenuKind(MenuKind),
    Category(u64),
    AddToCart(u64),
    ChangeCount { id: u64, delta: i64 },
    RemoveFromCart(u64),
    ClearCart,
    // booking
    OpenCalendar,
    CalendarPrev,
    CalendarNext,
    CloseCalendar,
    PickDate(NaiveDate),
    ActiveSlot(usize),
    OpenTable(u64),
    CloseTable,
    ChooseTime,
    ToggleBookingSlot(usize),
    EditBooking(BookingField),
    SubmitBooking,
    CloseBooking,
    // order
    Fulfillment(OrderType),
    EditTableNumber,
    SubmitOrder,
    FinishOrder,
    // profile
    ProfileSection(ProfileSection),
    EditProfile,
    EditProfileField(ProfileField),
    SaveProfile,
    CloseProfileEdit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownCallback(pub String);

impl fmt::Display for UnknownCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown callback query: '{}'", self.0)
    }
}

impl std::error::Error for UnknownCallback {}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackAction::Tab(tab) => write!(f, "tab:{}", tab.as_str()),
            CallbackAction::Back => write!(f, "back"),
            CallbackAction::Refresh => write!(f, "refresh"),
            CallbackAction::Close => write!(f, "close"),
            CallbackAction::MenuKind(kind) => write!(f, "mk:{}", kind.as_str()),
            CallbackAction::Category(id) => write!(f, "cat:{}", id),
            CallbackAction::AddToCart(id) => write!(f, "add:{}", id),
            CallbackAction::ChangeCount { id, delta } => write!(f, "cnt:{}:{}", id, delta),
            CallbackAction::RemoveFromCart(id) => write!(f, "rm:{}", id),
            CallbackAction::ClearCart => write!(f, "clr"),
            CallbackAction::OpenCalendar => write!(f, "cal:open"),
            CallbackAction::CalendarPrev => write!(f, "cal:prev"),
            CallbackAction::CalendarNext => write!(f, "cal:next"),
            CallbackAction::CloseCalendar => write!(f, "cal:close"),
            CallbackAction::PickDate(date) => write!(f, "date:{}", date.format("%Y-%m-%d")),
            CallbackAction::ActiveSlot(idx) => write!(f, "slot:{}", idx),
            CallbackAction::OpenTable(id) => write!(f, "tbl:{}", id),
            CallbackAction::CloseTable => write!(f, "tbl:close"),
            CallbackAction::ChooseTime => write!(f, "tbl:time"),
            CallbackAction::ToggleBookingSlot(idx) => write!(f, "bslot:{}", idx),
            CallbackAction::EditBooking(field) => write!(f, "bfield:{}", field.key()),
            CallbackAction::SubmitBooking => write!(f, "bsubmit"),
            CallbackAction::CloseBooking => write!(f, "bclose"),
            CallbackAction::Fulfillment(OrderType::DineIn) => write!(f, "mode:dine_in"),
            CallbackAction::Fulfillment(OrderType::Takeaway) => write!(f, "mode:takeaway"),
            CallbackAction::EditTableNumber => write!(f, "otable"),
            CallbackAction::SubmitOrder => write!(f, "osubmit"),
            CallbackAction::FinishOrder => write!(f, "odone"),
            CallbackAction::ProfileSection(section) => write!(f, "psec:{}", section.as_str()),
            CallbackAction::EditProfile => write!(f, "pedit"),
            CallbackAction::EditProfileField(field) => write!(f, "pfield:{}", field.key()),
            CallbackAction::SaveProfile => write!(f, "psave"),
            CallbackAction::CloseProfileEdit => write!(f, "pclose"),
        }
    }
}

impl FromStr for CallbackAction {
    type Err = UnknownCallback;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCallback(data.to_string());
        let (cmd, arg) = data.split_once(':').unwrap_or((data, ""));
        let id = |arg: &str| arg.parse::<u64>().map_err(|_| unknown());
        let idx = |arg: &str| arg.parse::<usize>().map_err(|_| unknown());

        let action = match (cmd, arg) {
            ("tab", tab) => CallbackAction::Tab(tab.parse().map_err(|_| unknown())?),
            ("back", _) => CallbackAction::Back,
            ("refresh", _) => CallbackAction::Refresh,
            ("close", _) => CallbackAction::Close,
            ("mk", kind) => CallbackAction::MenuKind(kind.parse().map_err(|_| unknown())?),
            ("cat", arg) => CallbackAction::Category(id(arg)?),
            ("add", arg) => CallbackAction::AddToCart(id(arg)?),
            ("cnt", arg) => {
                let (item, delta) = arg.split_once(':').ok_or_else(unknown)?;
                CallbackAction::ChangeCount {
                    id: id(item)?,
                    delta: delta.parse().map_err(|_| unknown())?,
                }
            }
            ("rm", arg) => CallbackAction::RemoveFromCart(id(arg)?),
            ("clr", _) => CallbackAction::ClearCart,
            ("cal", "open") => CallbackAction::OpenCalendar,
            ("cal", "prev") => CallbackAction::CalendarPrev,
            ("cal", "next") => CallbackAction::CalendarNext,
            ("cal", "close") => CallbackAction::CloseCalendar,
            ("date", arg) => CallbackAction::PickDate(
                NaiveDate::parse_from_str(arg, "%Y-%m-%d").map_err(|_| unknown())?,
            ),
            ("slot", arg) => CallbackAction::ActiveSlot(idx(arg)?),
            ("tbl", "close") => CallbackAction::CloseTable,
            ("tbl", "time") => CallbackAction::ChooseTime,
            ("tbl", arg) => CallbackAction::OpenTable(id(arg)?),
            ("bslot", arg) => CallbackAction::ToggleBookingSlot(idx(arg)?),
            ("bfield", key) => {
                CallbackAction::EditBooking(BookingField::from_key(key).ok_or_else(unknown)?)
            }
            ("bsubmit", _) => CallbackAction::SubmitBooking,
            ("bclose", _) => CallbackAction::CloseBooking,
            ("mode", "dine_in") => CallbackAction::Fulfillment(OrderType::DineIn),
            ("mode", "takeaway") => CallbackAction::Fulfillment(OrderType::Takeaway),
            ("otable", _) => CallbackAction::EditTableNumber,
            ("osubmit", _) => CallbackAction::SubmitOrder,
            ("odone", _) => CallbackAction::FinishOrder,
            ("psec", section) => {
                CallbackAction::ProfileSection(section.parse().map_err(|_| unknown())?)
            }
            ("pedit", _) => CallbackAction::EditProfile,
            ("pfield", key) => {
                CallbackAction::EditProfileField(ProfileField::from_key(key).ok_or_else(unknown)?)
            }
            ("psave", _) => CallbackAction::SaveProfile,
            ("pclose", _) => CallbackAction::CloseProfileEdit,
            _ => return Err(unknown()),
        };

        Ok(action)
    }
}
