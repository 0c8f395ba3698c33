use thiserror::Error;

use crate::data_types::booking_data_types::FormErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InitDataError {
    #[error("init data has no hash")]
    MissingHash,
    #[error("init data hash mismatch")]
    BadSignature,
    #[error("init data field '{0}' is malformed")]
    Malformed(&'static str),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Пожалуйста, заполните все обязательные поля. {}", join_messages(.0))]
    Invalid(FormErrors),
    #[error("no table selected")]
    MissingTable,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Корзина пуста")]
    EmptyCart,
    #[error("Укажите номер столика")]
    MissingTableNumber,
    #[error(transparent)]
    Api(#[from] ApiError),
}

fn join_messages(errors: &FormErrors) -> String {
    errors.values().copied().collect::<Vec<_>>().join(" ")
}
