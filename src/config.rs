use std::{env, path::PathBuf};

use crate::constants::{DEFAULT_API_URL, DEFAULT_RESTAURANT_ID, UNICORN_DB};

pub const API_URL_ENV: &str = "API_URL";
pub const RESTAURANT_ID_ENV: &str = "RESTAURANT_ID";
pub const DB_ENV: &str = "UNICORN_DB";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub restaurant_id: u64,
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            restaurant_id: DEFAULT_RESTAURANT_ID,
            db_path: PathBuf::from(UNICORN_DB),
        }
    }
}

impl Config {
    /// Reads `API_URL`, `RESTAURANT_ID` and `UNICORN_DB`, falling back to the defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let api_url = env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.api_url);

        let restaurant_id = match env::var(RESTAURANT_ID_ENV) {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid {}='{}'", RESTAURANT_ID_ENV, raw);
                defaults.restaurant_id
            }),
            Err(_) => defaults.restaurant_id,
        };

        let db_path = env::var(DB_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        Config {
            api_url,
            restaurant_id,
            db_path,
        }
    }
}
