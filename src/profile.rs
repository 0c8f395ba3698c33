use std::{collections::HashSet, fmt, str::FromStr, sync::Arc};

use crate::{
    cache::ExpiringCache,
    constants::{PROFILE_SHEET_HANDLE_PX, PROFILE_TTL, UNDEFINED_LABEL},
    data_backend::{order_api, profile_api, ApiClient},
    data_types::{
        order_data_types::Order,
        profile_data_types::{Achievement, ProfileField, ProfileForm, TelegramUser, UserProfile},
    },
    errors::ApiError,
    router::{Tab, TabChange},
    sheet::Sheet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileSection {
    #[default]
    Main,
    Qr,
    Achievements,
    About,
    Orders,
}

impl ProfileSection {
    /// sections reachable from the main page, in display order
    pub const LINKS: [ProfileSection; 4] = [
        ProfileSection::Qr,
        ProfileSection::Achievements,
        ProfileSection::About,
        ProfileSection::Orders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileSection::Main => "main",
            ProfileSection::Qr => "qr",
            ProfileSection::Achievements => "achievements",
            ProfileSection::About => "about",
            ProfileSection::Orders => "orders",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ProfileSection::Main => "Профиль",
            ProfileSection::Qr => "Мой QR",
            ProfileSection::Achievements => "Достижения",
            ProfileSection::About => "Обо мне",
            ProfileSection::Orders => "История заказов",
        }
    }
}

impl fmt::Display for ProfileSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(ProfileSection::Main),
            "qr" => Ok(ProfileSection::Qr),
            "achievements" => Ok(ProfileSection::Achievements),
            "about" => Ok(ProfileSection::About),
            "orders" => Ok(ProfileSection::Orders),
            other => Err(format!("unknown profile section '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed(String),
}

/// Ten minute caches for everything the profile screen fetches.
pub struct ProfileCaches {
    profile: ExpiringCache<(), UserProfile>,
    achievements: ExpiringCache<(), Vec<Achievement>>,
    orders: ExpiringCache<(), Vec<Order>>,
}

impl Default for ProfileCaches {
    fn default() -> Self {
        ProfileCaches {
            profile: ExpiringCache::new(PROFILE_TTL),
            achievements: ExpiringCache::new(PROFILE_TTL),
            orders: ExpiringCache::new(PROFILE_TTL),
        }
    }
}

impl ProfileCaches {
    pub fn profile(&self) -> &ExpiringCache<(), UserProfile> {
        &self.profile
    }

    pub fn achievements(&self) -> &ExpiringCache<(), Vec<Achievement>> {
        &self.achievements
    }

    pub fn orders(&self) -> &ExpiringCache<(), Vec<Order>> {
        &self.orders
    }
}

pub struct ProfileScreen {
    user: Option<TelegramUser>,
    section: ProfileSection,
    profile: Option<Arc<UserProfile>>,
    profile_error: bool,
    achievements: Arc<Vec<Achievement>>,
    achievements_error: bool,
    orders: Arc<Vec<Order>>,
    orders_error: bool,
    edit_sheet: Sheet,
    form: ProfileForm,
    save_state: SaveState,
    caches: ProfileCaches,
}

impl ProfileScreen {
    pub fn new(user: Option<TelegramUser>) -> Self {
        ProfileScreen {
            user,
            section: ProfileSection::Main,
            profile: None,
            profile_error: false,
            achievements: Arc::default(),
            achievements_error: false,
            orders: Arc::default(),
            orders_error: false,
            edit_sheet: Sheet::with_handle_zone(PROFILE_SHEET_HANDLE_PX),
            form: ProfileForm::default(),
            save_state: SaveState::Idle,
            caches: ProfileCaches::default(),
        }
    }

    pub fn caches(&self) -> &ProfileCaches {
        &self.caches
    }

    pub fn user(&self) -> Option<&TelegramUser> {
        self.user.as_ref()
    }

    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .map_or_else(|| UNDEFINED_LABEL.to_string(), TelegramUser::display_name)
    }

    pub fn username(&self) -> String {
        self.user
            .as_ref()
            .map_or_else(|| UNDEFINED_LABEL.to_string(), TelegramUser::handle)
    }

    pub fn section(&self) -> ProfileSection {
        self.section
    }

    /// selecting the profile tab always lands on the main page
    pub fn on_tab_change(&mut self, change: TabChange) {
        if change.to == Tab::Profile && self.section != ProfileSection::Main {
            self.section = ProfileSection::Main;
        }
    }

    pub async fn open_section(&mut self, api: &ApiClient, section: ProfileSection) {
        self.section = section;
        match section {
            ProfileSection::Achievements => self.load_achievements(api).await,
            ProfileSection::Orders => self.load_orders(api).await,
            ProfileSection::About => self.load_profile(api).await,
            ProfileSection::Main | ProfileSection::Qr => {}
        }
    }

    pub fn close_section(&mut self) {
        self.section = ProfileSection::Main;
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_deref()
    }

    pub fn profile_failed(&self) -> bool {
        self.profile_error
    }

    pub async fn load_profile(&mut self, api: &ApiClient) {
        match self
            .caches
            .profile
            .get_or_fetch((), || profile_api::get_me(api))
            .await
        {
            Ok(profile) => {
                self.profile = Some(profile);
                self.profile_error = false;
            }
            Err(e) => {
                log::error!("Error fetching user profile: {}", e);
                self.profile_error = true;
            }
        }
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn achievements_failed(&self) -> bool {
        self.achievements_error
    }

    /// Every achievement, with the earned flags of the user merged in.
    pub async fn load_achievements(&mut self, api: &ApiClient) {
        let result = self
            .caches
            .achievements
            .get_or_fetch((), || fetch_achievements(api))
            .await;

        match result {
            Ok(achievements) => {
                self.achievements = achievements;
                self.achievements_error = false;
            }
            Err(e) => {
                log::error!("Error fetching achievements: {}", e);
                self.achievements_error = true;
            }
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn orders_failed(&self) -> bool {
        self.orders_error
    }

    pub async fn load_orders(&mut self, api: &ApiClient) {
        match self
            .caches
            .orders
            .get_or_fetch((), || order_api::get_orders(api))
            .await
        {
            Ok(orders) => {
                self.orders = orders;
                self.orders_error = false;
            }
            Err(e) => {
                log::error!("Error fetching orders: {}", e);
                self.orders_error = true;
            }
        }
    }

    // edit sheet

    pub fn edit_sheet(&self) -> &Sheet {
        &self.edit_sheet
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn save_state(&self) -> &SaveState {
        &self.save_state
    }

    /// opens the sheet with the stored profile filled in
    pub async fn open_edit(&mut self, api: &ApiClient) {
        self.load_profile(api).await;
        self.form = self
            .profile
            .as_deref()
            .map(ProfileForm::from_profile)
            .unwrap_or_default();
        self.save_state = SaveState::Idle;
        self.edit_sheet.open_now();
    }

    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) {
        let value: String = value.into();
        self.form.set(field, value.trim());
    }

    pub fn close_edit(&mut self) {
        self.edit_sheet.close_now();
        self.save_state = SaveState::Idle;
    }

    /// `PUT /users/me`. A successful save closes the sheet and drops the
    /// cached profile so the next read is fresh.
    pub async fn save(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        self.save_state = SaveState::Saving;
        match profile_api::update_me(api, &self.form).await {
            Ok(_) => {
                log::info!("Profile saved");
                self.caches.profile.clear();
                self.profile = None;
                self.save_state = SaveState::Saved;
                self.edit_sheet.close_now();
                Ok(())
            }
            Err(e) => {
                log::error!("Saving profile failed: {}", e);
                self.save_state = SaveState::Failed("Ошибка сохранения".to_string());
                Err(e)
            }
        }
    }
}

async fn fetch_achievements(api: &ApiClient) -> Result<Vec<Achievement>, ApiError> {
    let mut all = profile_api::get_achievements(api).await?;

    // the user's list is only used for the flags
    match profile_api::get_my_achievements(api).await {
        Ok(mine) => {
            let earned: HashSet<u64> = mine
                .iter()
                .filter(|a| a.is_earned)
                .map(|a| a.id)
                .collect();
            merge_earned(&mut all, &earned);
        }
        Err(e) => log::warn!("Could not fetch earned achievements: {}", e),
    }

    Ok(all)
}

fn merge_earned(all: &mut [Achievement], earned: &HashSet<u64>) {
    for achievement in all.iter_mut() {
        achievement.is_earned |= earned.contains(&achievement.id);
    }
}
