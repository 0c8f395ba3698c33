use std::{collections::BTreeMap, env, sync::Arc};

use teloxide::{
    prelude::*,
    types::{Chat, MessageId, ParseMode, User},
    utils::markdown,
    ApiError as TelegramApiError, RequestError,
};
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};

use crate::{
    bot_views,
    config::Config,
    constants::SESSION_IDLE_TTL,
    data_backend::ApiClient,
    data_types::{
        profile_data_types::TelegramUser, CallbackAction, DialogueState, DialogueType,
        HandlerResult,
    },
    db_operations::SqliteStorage,
    errors::StorageError,
    host::HostEvent,
    init_data,
    session::{MiniApp, Outcome},
};

/// every private chat runs its own Mini-App
pub type Sessions = Arc<RwLock<BTreeMap<i64, Session>>>;

#[derive(Clone)]
pub struct Session {
    app: Arc<Mutex<MiniApp>>,
    last_used: Instant,
}

/// The app speaks for a single Telegram user, so group chats are refused.
pub fn is_private_chat(chat: &Chat) -> bool {
    chat.is_private()
}

pub fn logger_init(module: &str) {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(
            module,
            if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
                == "debug"
            {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();
}

/// Opens sessions for chats: per-chat storage scope and init data signed with the bot token.
#[derive(Clone)]
pub struct SessionFactory {
    config: Config,
    bot_token: Arc<str>,
}

impl SessionFactory {
    pub fn new(config: Config, bot_token: &str) -> Self {
        SessionFactory {
            config,
            bot_token: Arc::from(bot_token),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// No user (channel posts, anonymous admins) means no init data.
    pub fn init_data_for(&self, user: Option<&User>) -> String {
        let Some(user) = user else {
            return String::new();
        };
        let user = telegram_user(user);
        let auth_date = chrono::Utc::now().timestamp();

        match init_data::sign(&self.bot_token, &user, auth_date, None) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Signing init data for {} failed: {}", user.id, e);
                String::new()
            }
        }
    }

    pub async fn get_or_create(
        &self,
        sessions: &Sessions,
        chat_id: ChatId,
        user: Option<&User>,
    ) -> Result<Arc<Mutex<MiniApp>>, StorageError> {
        let now = Instant::now();
        let existing = {
            let mut sessions = sessions.write().await;
            sessions.retain(|chat, session| {
                let fresh = now.duration_since(session.last_used) < SESSION_IDLE_TTL;
                if !fresh {
                    log::debug!("Evict idle session {}", chat);
                }
                fresh
            });
            sessions.get_mut(&chat_id.0).map(|session| {
                session.last_used = now;
                session.app.clone()
            })
        };

        if let Some(app) = existing {
            // backends reject payloads with an old auth_date
            if user.is_some() {
                app.lock().await.renew_init_data(&self.init_data_for(user));
            }
            return Ok(app);
        }

        let storage = SqliteStorage::open(&self.config.db_path, chat_id.0)?;
        let api = ApiClient::new(&self.config.api_url, self.init_data_for(user));
        let mut app = MiniApp::new(
            api,
            self.config.restaurant_id,
            Arc::new(storage),
            chrono::Local::now().date_naive(),
        );
        app.launch().await;
        log::debug!("Launch session {}: {:.2?}", chat_id, now.elapsed());

        let session = Session {
            app: Arc::new(Mutex::new(app)),
            last_used: Instant::now(),
        };
        Ok(sessions
            .write()
            .await
            .entry(chat_id.0)
            .or_insert(session)
            .app
            .clone())
    }
}

fn telegram_user(user: &User) -> TelegramUser {
    TelegramUser {
        id: user.id.0 as i64,
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        language_code: user.language_code.clone(),
        photo_url: None,
    }
}

pub async fn send_screen(bot: &Bot, chat_id: ChatId, app: &MiniApp) -> HandlerResult {
    let (text, keyboard) = bot_views::render(app);
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

async fn edit_screen(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    app: &MiniApp,
) -> HandlerResult {
    let (text, keyboard) = bot_views::render(app);
    match bot
        .edit_message_text(chat_id, message_id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(keyboard)
        .await
    {
        Ok(_) | Err(RequestError::Api(TelegramApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Forwards queued host calls to the chat. Returns true once the app asked to close.
pub async fn flush_host_events(
    bot: &Bot,
    chat_id: ChatId,
    app: &mut MiniApp,
) -> Result<bool, RequestError> {
    let mut closed = false;
    for event in app.host_mut().drain_events() {
        match event {
            HostEvent::Popup { title, message } => {
                bot.send_message(
                    chat_id,
                    format!(
                        "{}\n{}",
                        markdown::bold(&markdown::escape(&title)),
                        markdown::escape(&message)
                    ),
                )
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
            }
            HostEvent::Close => closed = true,
            other => log::debug!("{}: {:?}", chat_id, other),
        }
    }
    Ok(closed)
}

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: DialogueType,
    sessions: Sessions,
    factory: SessionFactory,
) -> HandlerResult {
    if let Some(q_data) = q.data {
        // acknowledge callback query to remove the loading alert
        bot.answer_callback_query(q.id).await?;

        if let Some(message) = q.message {
            let id = message.id();
            let chat = message.chat();

            let action = match q_data.parse::<CallbackAction>() {
                Ok(action) => action,
                Err(e) => {
                    log::warn!("{}", e);
                    return Ok(());
                }
            };

            let now = Instant::now();
            let session = factory
                .get_or_create(&sessions, chat.id, Some(&q.from))
                .await?;
            let mut app = session.lock().await;

            if let Outcome::AskInput(field) = app.apply(action).await {
                bot.send_message(chat.id, field.prompt()).await?;
                dialogue.update(DialogueState::AwaitInput(field)).await?;
            }
            log::debug!("Apply {}: {:.2?}", action, now.elapsed());

            edit_screen(&bot, chat.id, id, &app).await?;

            if flush_host_events(&bot, chat.id, &mut app).await? {
                drop(app);
                sessions.write().await.remove(&chat.id.0);
                dialogue.exit().await?;
                bot.send_message(chat.id, "До встречи! /start открывает приложение снова.")
                    .await?;
            }
        }
    }

    Ok(())
}
