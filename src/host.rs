use std::collections::VecDeque;

use crate::{
    constants::HEADER_COLOR,
    data_types::profile_data_types::TelegramUser,
    init_data::{self, InitData},
};

/// UI chrome calls towards the embedding Telegram client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Expand,
    HeaderColor(String),
    BackButton(bool),
    Popup { title: String, message: String },
    Close,
}

/// The host platform as seen from the app: an init payload plus a queue of
/// chrome calls that the rendering surface drains.
#[derive(Debug, Clone, Default)]
pub struct HostBridge {
    init_data: String,
    user: Option<TelegramUser>,
    back_button: bool,
    events: VecDeque<HostEvent>,
}

impl HostBridge {
    /// An empty payload means the app was not opened through Telegram.
    pub fn new(init_data: impl Into<String>) -> Self {
        let init_data = init_data.into();
        let user = match init_data::parse(&init_data) {
            Ok(InitData { user, .. }) => user,
            Err(e) => {
                if !init_data.is_empty() {
                    log::warn!("Unreadable init data: {}", e);
                }
                None
            }
        };

        HostBridge {
            init_data,
            user,
            ..Default::default()
        }
    }

    pub fn init_data(&self) -> &str {
        &self.init_data
    }

    /// A re-signed payload for the same user. The user parsed at launch stays.
    pub fn set_init_data(&mut self, init_data: impl Into<String>) {
        self.init_data = init_data.into();
    }

    pub fn has_init_data(&self) -> bool {
        !self.init_data.is_empty()
    }

    pub fn user(&self) -> Option<&TelegramUser> {
        self.user.as_ref()
    }

    /// expand the viewport and paint the header, done once at launch
    pub fn ready(&mut self) {
        self.events.push_back(HostEvent::Expand);
        self.events
            .push_back(HostEvent::HeaderColor(HEADER_COLOR.to_string()));
    }

    pub fn back_button_visible(&self) -> bool {
        self.back_button
    }

    /// only queues a call when the visibility actually changes
    pub fn set_back_button(&mut self, visible: bool) {
        if self.back_button != visible {
            self.back_button = visible;
            self.events.push_back(HostEvent::BackButton(visible));
        }
    }

    pub fn show_popup(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.events.push_back(HostEvent::Popup {
            title: title.into(),
            message: message.into(),
        });
    }

    pub fn close(&mut self) {
        self.events.push_back(HostEvent::Close);
    }

    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_button_changes_are_queued_once() {
        let mut host = HostBridge::new("");
        host.set_back_button(true);
        host.set_back_button(true);
        host.set_back_button(false);

        assert_eq!(
            host.drain_events(),
            vec![HostEvent::BackButton(true), HostEvent::BackButton(false)]
        );
        assert!(host.drain_events().is_empty());
    }

    #[test]
    fn user_comes_from_init_data() {
        let user = TelegramUser {
            id: 7,
            first_name: Some("Ivan".into()),
            ..Default::default()
        };
        let raw = init_data::sign("1:token", &user, 1_716_000_000, None).unwrap();
        let host = HostBridge::new(raw);

        assert!(host.has_init_data());
        assert_eq!(host.user(), Some(&user));
        assert!(!HostBridge::new("").has_init_data());
    }
}
