use serde::{Deserialize, Serialize};

use crate::constants::UNDEFINED_LABEL;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Achievement {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required_points: Option<u32>,
    #[serde(default)]
    pub is_earned: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub favorite_dish: Option<String>,
}

impl UserProfile {
    /// "first last", trimmed; None if both are empty
    pub fn full_name(&self) -> Option<String> {
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// body of `PUT /users/me`; every field is sent, empty strings included
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub birthdate: String,
    pub favorite_dish: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProfileField {
    FirstName,
    LastName,
    PhoneNumber,
    Birthdate,
    FavoriteDish,
}

impl ProfileField {
    pub const ALL: [ProfileField; 5] = [
        ProfileField::FirstName,
        ProfileField::LastName,
        ProfileField::PhoneNumber,
        ProfileField::Birthdate,
        ProfileField::FavoriteDish,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::FirstName => "first_name",
            ProfileField::LastName => "last_name",
            ProfileField::PhoneNumber => "phone_number",
            ProfileField::Birthdate => "birthdate",
            ProfileField::FavoriteDish => "favorite_dish",
        }
    }

    pub fn from_key(key: &str) -> Option<ProfileField> {
        ProfileField::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::FirstName => "Имя",
            ProfileField::LastName => "Фамилия",
            ProfileField::PhoneNumber => "Телефон",
            ProfileField::Birthdate => "Дата рождения",
            ProfileField::FavoriteDish => "Любимое блюдо",
        }
    }
}

impl ProfileForm {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        ProfileForm {
            first_name: text(&profile.first_name),
            last_name: text(&profile.last_name),
            phone_number: text(&profile.phone_number),
            birthdate: text(&profile.birthdate),
            favorite_dish: text(&profile.favorite_dish),
        }
    }

    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FirstName => &self.first_name,
            ProfileField::LastName => &self.last_name,
            ProfileField::PhoneNumber => &self.phone_number,
            ProfileField::Birthdate => &self.birthdate,
            ProfileField::FavoriteDish => &self.favorite_dish,
        }
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::FirstName => self.first_name = value,
            ProfileField::LastName => self.last_name = value,
            ProfileField::PhoneNumber => self.phone_number = value,
            ProfileField::Birthdate => self.birthdate = value,
            ProfileField::FavoriteDish => self.favorite_dish = value,
        }
    }
}

/// `user` object of the WebApp init payload
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl TelegramUser {
    pub fn display_name(&self) -> String {
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
            .unwrap_or_else(|| UNDEFINED_LABEL.to_string())
    }

    pub fn handle(&self) -> String {
        match self.username.as_deref() {
            Some(name) if !name.is_empty() => format!("@{}", name),
            _ => UNDEFINED_LABEL.to_string(),
        }
    }
}

fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
    let joined = joined.trim();
    if joined.is_empty() {
        None
    } else {
        Some(joined.to_string())
    }
}
