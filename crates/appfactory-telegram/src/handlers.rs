//! Command and message handlers for the Telegram bot.

use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use appfactory_core::{extract_app_name, is_app_request, Factory};
use appfactory_models::{ServerEvent, TelegramRelayMessage};

use crate::messages::{self, StatusSnapshot};

/// Longest text Telegram accepts in one message.
const MAX_MESSAGE_CHARS: usize = 4096;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Welcome message")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Check bot status")]
    Status,

    #[command(description = "Delete app repositories (admins only): /cleanup [repo ...]")]
    Cleanup(String),
}

/// Parses a command regardless of the case of its name.
///
/// `/STATUS@MyBot now` is read as `/status@MyBot now`; arguments keep
/// their case.
pub fn parse_command(text: &str, bot_username: &str) -> Option<Command> {
    if !text.starts_with('/') {
        return None;
    }
    let (head, rest) = match text.find(char::is_whitespace) {
        Some(i) => text.split_at(i),
        None => (text, ""),
    };
    let normalized = match head.split_once('@') {
        Some((name, bot)) => format!("{}@{}{}", name.to_lowercase(), bot, rest),
        None => format!("{}{}", head.to_lowercase(), rest),
    };
    Command::parse(&normalized, bot_username).ok()
}

/// Whether `text` is a command addressed to this bot that did not parse.
///
/// Commands addressed to other bots in a group are not ours to answer.
pub fn is_unknown_command(text: &str, bot_username: &str) -> bool {
    if !text.starts_with('/') || parse_command(text, bot_username).is_some() {
        return false;
    }
    let head = text.split_whitespace().next().unwrap_or(text);
    match head.split_once('@') {
        Some((_, bot)) => bot.eq_ignore_ascii_case(bot_username),
        None => true,
    }
}

/// Repositories named in `/cleanup` arguments; `None` means all apps.
pub fn cleanup_targets(args: &str) -> Option<Vec<String>> {
    let repos: Vec<String> = args.split_whitespace().map(str::to_string).collect();
    if repos.is_empty() {
        None
    } else {
        Some(repos)
    }
}

/// Cuts `text` to Telegram's message size.
pub fn fit_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    cut.push('…');
    cut
}

fn display_name(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|u| {
            u.username
                .clone()
                .unwrap_or_else(|| u.first_name.clone())
        })
        .unwrap_or_else(|| "there".to_string())
}

/// Dispatch a parsed command.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    factory: Arc<Factory>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, messages::start(&display_name(&msg)))
                .await?;
            info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "User started bot");
        }
        Command::Help => {
            bot.send_message(msg.chat.id, messages::help()).await?;
        }
        Command::Status => {
            let snapshot = StatusSnapshot {
                bot: factory.bot_status().await,
                providers: factory
                    .generator()
                    .provider_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                chat_live: factory.relay().is_configured(),
                deploy_live: factory.deployer().is_configured(),
                apps: factory.registry().len().await,
                time: Utc::now(),
            };
            bot.send_message(msg.chat.id, messages::status(&snapshot))
                .await?;
        }
        Command::Cleanup(args) => handle_cleanup(bot, msg, &args, factory).await?,
    }
    Ok(())
}

async fn handle_cleanup(
    bot: Bot,
    msg: Message,
    args: &str,
    factory: Arc<Factory>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    if !factory.config().is_admin(chat_id) {
        warn!(chat_id, "Cleanup refused for non-admin chat");
        bot.send_message(msg.chat.id, messages::NOT_AUTHORIZED)
            .await?;
        return Ok(());
    }

    let targets = cleanup_targets(args);
    info!(chat_id, explicit = targets.is_some(), "Cleanup requested over Telegram");
    let progress = bot
        .send_message(msg.chat.id, messages::CLEANUP_STARTED)
        .await?;

    let text = match factory.cleanup(targets).await {
        Ok(summary) => messages::cleanup_done(&summary),
        Err(e) => {
            error!(chat_id, error = %e, "Cleanup failed");
            messages::cleanup_failed(&e.to_string())
        }
    };
    bot.edit_message_text(msg.chat.id, progress.id, fit_message(&text))
        .await?;
    Ok(())
}

/// Handle a non-command text message.
pub async fn handle_message(bot: Bot, msg: Message, factory: Arc<Factory>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if is_app_request(text) {
        handle_app_request(bot, &msg, text, factory).await
    } else {
        handle_chat(bot, &msg, text, factory).await
    }
}

async fn handle_app_request(
    bot: Bot,
    msg: &Message,
    text: &str,
    factory: Arc<Factory>,
) -> ResponseResult<()> {
    let working = bot.send_message(msg.chat.id, messages::WORKING).await?;

    let Some(app_name) = extract_app_name(text) else {
        bot.edit_message_text(msg.chat.id, working.id, messages::MISSING_APP_NAME)
            .await?;
        return Ok(());
    };

    let caller = msg
        .from
        .as_ref()
        .map(|u| u.id.0.to_string())
        .unwrap_or_else(|| msg.chat.id.0.to_string());

    let reply = match factory.create_app(&app_name, &caller).await {
        Ok(created) => messages::app_ready(&created),
        Err(e) => {
            error!(chat_id = %msg.chat.id, app = %app_name, error = %e, "App creation failed");
            messages::app_failed(&e.to_string())
        }
    };

    bot.edit_message_text(msg.chat.id, working.id, fit_message(&reply))
        .await?;
    Ok(())
}

async fn handle_chat(
    bot: Bot,
    msg: &Message,
    text: &str,
    factory: Arc<Factory>,
) -> ResponseResult<()> {
    let conversation_id = format!("telegram_{}", msg.chat.id.0);
    let reply = factory.chat(text, Some(&conversation_id)).await;
    debug!(chat_id = %msg.chat.id, mock = reply.mock, "Chat reply ready");

    if reply.content.trim().is_empty() {
        bot.send_message(msg.chat.id, messages::CHAT_FAILED).await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, fit_message(&reply.content))
        .await?;

    factory.broadcast(ServerEvent::TelegramMessage(TelegramRelayMessage {
        id: msg.id.0,
        chat_id: msg.chat.id.0,
        user_id: msg.from.as_ref().map(|u| u.id.0).unwrap_or_default(),
        username: display_name(msg),
        text: text.to_string(),
        response: reply.content,
        timestamp: reply.timestamp,
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_basic() {
        assert_eq!(parse_command("/start", "factory_bot"), Some(Command::Start));
        assert_eq!(parse_command("/help", "factory_bot"), Some(Command::Help));
        assert_eq!(parse_command("/status", "factory_bot"), Some(Command::Status));
    }

    #[test]
    fn test_parse_command_is_case_insensitive() {
        assert_eq!(parse_command("/START", "factory_bot"), Some(Command::Start));
        assert_eq!(parse_command("/Status@factory_bot", "factory_bot"), Some(Command::Status));
    }

    #[test]
    fn test_parse_cleanup_keeps_argument_case() {
        assert_eq!(
            parse_command("/CLEANUP Octo/Repo-1", "factory_bot"),
            Some(Command::Cleanup("Octo/Repo-1".to_string()))
        );
        assert_eq!(
            parse_command("/cleanup", "factory_bot"),
            Some(Command::Cleanup(String::new()))
        );
    }

    #[test]
    fn test_parse_command_rejects_other_text() {
        assert_eq!(parse_command("make me the app blog", "factory_bot"), None);
        assert_eq!(parse_command("/deploy", "factory_bot"), None);
        assert_eq!(parse_command("/start@other_bot", "factory_bot"), None);
    }

    #[test]
    fn test_unknown_command_detection() {
        assert!(is_unknown_command("/deploy now", "factory_bot"));
        assert!(is_unknown_command("/deploy@factory_bot", "factory_bot"));
        assert!(!is_unknown_command("/deploy@other_bot", "factory_bot"));
        assert!(!is_unknown_command("/help", "factory_bot"));
        assert!(!is_unknown_command("hello", "factory_bot"));
    }

    #[test]
    fn test_cleanup_targets() {
        assert_eq!(cleanup_targets("   "), None);
        assert_eq!(
            cleanup_targets("a octo/b"),
            Some(vec!["a".to_string(), "octo/b".to_string()])
        );
    }

    #[test]
    fn test_fit_message() {
        assert_eq!(fit_message("short"), "short");

        let long = "é".repeat(5000);
        let cut = fit_message(&long);
        assert_eq!(cut.chars().count(), MAX_MESSAGE_CHARS);
        assert!(cut.ends_with('…'));
    }
}
