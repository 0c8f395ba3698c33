use std::time::Instant;

use teloxide::prelude::*;

use crate::{
    data_types::{Command, DialogueType, HandlerResult, InputField},
    shared_main::{flush_host_events, send_screen, SessionFactory, Sessions},
};

/// /start, /menu, /booking, /profile and /cart all open their screen as a fresh message
pub async fn open_tab(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: DialogueType,
    sessions: Sessions,
    factory: SessionFactory,
) -> HandlerResult {
    let Some(tab) = cmd.tab() else {
        return Ok(());
    };
    // a command abandons any pending text prompt
    dialogue.exit().await?;

    let now = Instant::now();
    let session = factory
        .get_or_create(&sessions, msg.chat.id, msg.from.as_ref())
        .await?;
    let mut app = session.lock().await;
    app.navigate(tab).await;
    log::debug!("Open {:?}: {:.2?}", cmd, now.elapsed());

    send_screen(&bot, msg.chat.id, &app).await?;
    flush_host_events(&bot, msg.chat.id, &mut app).await?;
    Ok(())
}

pub async fn cancel(bot: Bot, msg: Message, dialogue: DialogueType) -> HandlerResult {
    dialogue.exit().await?;
    bot.send_message(msg.chat.id, "Отменено.").await?;
    Ok(())
}

pub async fn reply_input_dialogue(
    bot: Bot,
    msg: Message,
    dialogue: DialogueType,
    field: InputField,
    sessions: Sessions,
    factory: SessionFactory,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(
            msg.chat.id,
            format!("Это не текст.\n{}", field.prompt()),
        )
        .await?;
        return Ok(());
    };

    let session = factory
        .get_or_create(&sessions, msg.chat.id, msg.from.as_ref())
        .await?;
    let mut app = session.lock().await;
    app.apply_input(field, text);
    dialogue.exit().await?;

    send_screen(&bot, msg.chat.id, &app).await?;
    flush_host_events(&bot, msg.chat.id, &mut app).await?;
    Ok(())
}
