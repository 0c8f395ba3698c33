use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";
pub const DEFAULT_RESTAURANT_ID: u64 = 1;
pub const UNICORN_DB: &str = "unicorn.sqlite";

pub const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";
pub const CART_STORAGE_KEY: &str = "cartItems";

pub const AVAILABILITY_TTL: Duration = Duration::from_secs(5 * 60);
pub const PROFILE_TTL: Duration = Duration::from_secs(10 * 60);
// idle chats are relaunched on their next update
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

// fixed two hour slots shown on the booking screen
pub const SLOT_FIRST_START_HOUR: u32 = 11;
pub const SLOT_LAST_START_HOUR: u32 = 21;
pub const SLOT_LENGTH_HOURS: u32 = 2;
pub const RESERVATION_DURATION_MIN: u32 = 120;

pub const TABLE_NUMBERS: std::ops::RangeInclusive<u32> = 1..=12;

pub const SHEET_DISMISS_THRESHOLD_PX: f32 = 100.0;
pub const PROFILE_SHEET_HANDLE_PX: f32 = 50.0;

pub const HEADER_COLOR: &str = "#FFFBF7";
pub const UNDEFINED_LABEL: &str = "Не определено";
pub const NO_INIT_DATA_MSG: &str = "Для входа в приложение откройте его через Telegram.";
pub const LOAD_FAILED_MSG: &str = "Не удалось загрузить данные.";
