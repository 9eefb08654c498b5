use anyhow::Result;
use std::sync::Arc;

use super::telegram::{BotApi, InlineKeyboardMarkup, Update};

pub const START_REPLY: &str =
    "Hi! \u{1F44B} Tap \u{00AB}Play\u{00BB} to open \u{201C}1000 facts\u{201D}.";
pub const PLAY_REPLY: &str = "Open the game:";
pub const PLAY_BUTTON: &str = "\u{1F3AE} Play";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Play,
}

/// Recognise `/start` and `/play`, including the `/start@SomeBot payload` form.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.split('@').next().unwrap_or(first);
    match name {
        "/start" => Some(Command::Start),
        "/play" => Some(Command::Play),
        _ => None,
    }
}

/// Answers bot commands with a button that opens the fact deck.
pub struct Bot {
    api: Arc<dyn BotApi>,
    web_app_url: String,
}

impl Bot {
    pub fn new(api: Arc<dyn BotApi>, web_app_url: String) -> Self {
        Self { api, web_app_url }
    }

    pub fn api(&self) -> Arc<dyn BotApi> {
        Arc::clone(&self.api)
    }

    /// Handle one update. Updates that are not one of our commands are ignored.
    pub fn handle_update(&self, update: &Update) -> Result<()> {
        let Some(message) = &update.message else {
            return Ok(());
        };
        let Some(command) = message.text.as_deref().and_then(parse_command) else {
            return Ok(());
        };
        tracing::debug!(update_id = update.update_id, ?command, "bot command");

        let reply = match command {
            Command::Start => START_REPLY,
            Command::Play => PLAY_REPLY,
        };
        let keyboard = InlineKeyboardMarkup::web_app_button(PLAY_BUTTON, &self.web_app_url);
        self.api
            .send_message(message.chat.id, reply, Some(&keyboard))
    }
}
