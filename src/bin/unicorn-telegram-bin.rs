use unicorn_telegram_rs::bot_command_handlers::{cancel, open_tab, reply_input_dialogue};
use unicorn_telegram_rs::config::Config;
use unicorn_telegram_rs::data_types::{Command, DialogueState, HandlerResult};
use unicorn_telegram_rs::db_operations::check_or_create_db_tables;
use unicorn_telegram_rs::shared_main::{
    callback_handler, is_private_chat, logger_init, SessionFactory, Sessions,
};

use anyhow::Context;
use clap::Parser;
use log::log_enabled;
use std::path::PathBuf;
use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        UpdateHandler,
    },
    prelude::*,
    utils::command::BotCommands,
};

/// Telegram bot serving the Unicorn restaurant Mini-App: menu, cart, orders,
/// table booking and the guest profile.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// The telegram bot token to be used, also signs the init data sent to the backend
    #[arg(short, long, env = "TELOXIDE_TOKEN")]
    token: String,
    /// Backend API base URL{n}[env: API_URL, default: http://127.0.0.1:8000/api/v1]
    #[arg(short, long)]
    api_url: Option<String>,
    /// Restaurant the app books tables and places orders for{n}[env: RESTAURANT_ID, default: 1]
    #[arg(short, long)]
    restaurant_id: Option<u64>,
    /// SQLite file holding every chat's local storage (the cart){n}[env: UNICORN_DB, default: unicorn.sqlite]
    #[arg(long)]
    db: Option<PathBuf>,
    /// enable verbose logging (mostly performance metrics){n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    //// Args setup
    let args = Args::parse();

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init(module_path!());
    log::info!("Starting bot...");

    if !(log_enabled!(log::Level::Debug) || log_enabled!(log::Level::Trace)) {
        log::info!("Enable verbose logging for performance metrics");
    }

    // flags win over the environment
    let env_config = Config::from_env();
    let config = Config {
        api_url: args.api_url.unwrap_or(env_config.api_url),
        restaurant_id: args.restaurant_id.unwrap_or(env_config.restaurant_id),
        db_path: args.db.unwrap_or(env_config.db_path),
    };
    log::info!(
        "Backend {} (restaurant {})",
        config.api_url,
        config.restaurant_id
    );

    //// DB setup
    check_or_create_db_tables(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;

    let bot = Bot::new(&args.token);
    bot.set_my_commands(Command::bot_commands())
        .await
        .context("registering bot commands")?;

    let deps = dptree::deps![
        InMemStorage::<DialogueState>::new(),
        Sessions::default(),
        SessionFactory::new(config, &args.token)
    ];
    Dispatcher::builder(bot, schema())
        .dependencies(deps)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Cancel].endpoint(cancel))
        .branch(dptree::endpoint(open_tab));

    let message_handler = Update::filter_message()
        .branch(
            dptree::filter(|msg: Message| !is_private_chat(&msg.chat)).endpoint(private_only),
        )
        .branch(command_handler)
        .branch(case![DialogueState::AwaitInput(field)].endpoint(reply_input_dialogue))
        .branch(dptree::endpoint(invalid_cmd));

    let callback_query_handler = Update::filter_callback_query()
        .branch(
            dptree::filter(|q: CallbackQuery| {
                q.message
                    .as_ref()
                    .is_some_and(|message| !is_private_chat(message.chat()))
            })
            .endpoint(private_only_callback),
        )
        .branch(dptree::endpoint(callback_handler));

    dialogue::enter::<Update, InMemStorage<DialogueState>, DialogueState, _>()
        .branch(message_handler)
        .branch(callback_query_handler)
}

async fn private_only(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "Приложение работает только в личном чате с ботом.")
        .await?;
    Ok(())
}

async fn private_only_callback(bot: Bot, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id)
        .text("Откройте бота в личном чате.")
        .await?;
    Ok(())
}

async fn invalid_cmd(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "Это не команда. /start открывает приложение.")
        .await?;
    Ok(())
}
