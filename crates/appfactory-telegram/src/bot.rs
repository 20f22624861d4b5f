//! Telegram bot with supervised long polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::update_listeners;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::utils::command::BotCommands;
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, info, warn};

use appfactory_core::Factory;

use crate::error::{Result, TelegramError};
use crate::handlers::{handle_command, handle_message, is_unknown_command, parse_command, Command};
use crate::reconnect::{PollState, ReconnectPolicy, RunOutcome, Supervisor};

/// The Telegram front end of the factory.
pub struct TelegramBot {
    bot: Bot,
    factory: Arc<Factory>,
    policy: ReconnectPolicy,
}

impl TelegramBot {
    /// Create a bot from the factory's configured token.
    pub fn new(factory: Arc<Factory>) -> Result<Self> {
        let token = factory
            .config()
            .telegram_token
            .clone()
            .ok_or(TelegramError::NoToken)?;

        Ok(Self {
            bot: Bot::new(token),
            factory,
            policy: ReconnectPolicy::default(),
        })
    }

    /// Replace the restart policy.
    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Publish the command list shown by Telegram clients.
    pub async fn register_commands(&self) -> Result<()> {
        self.bot.set_my_commands(Command::bot_commands()).await?;
        Ok(())
    }

    /// Poll for updates until stopped.
    ///
    /// A polling conflict shuts the dispatcher down and restarts it after
    /// the policy's backoff. Returns once the dispatcher stops on its own
    /// or the retries are used up.
    pub async fn run(&self) -> Result<()> {
        let username = match self.get_me().await {
            Ok(username) => username,
            Err(e) => {
                self.factory.set_bot_status(PollState::Stopped.to_bot_status()).await;
                return Err(e);
            }
        };
        info!(bot = %username, "Telegram bot authenticated");

        if let Err(e) = self.register_commands().await {
            warn!(error = %e, "Failed to register bot commands");
        }

        let mut supervisor = Supervisor::new(self.policy.clone());
        loop {
            let state = supervisor.on_started();
            self.factory.set_bot_status(state.to_bot_status()).await;
            info!("Bot is polling for updates");

            let (outcome, received_updates) = self.run_dispatcher().await;
            let state = supervisor.on_run_ended(outcome, received_updates);
            self.factory.set_bot_status(state.to_bot_status()).await;

            match state {
                PollState::BackingOff { attempt, delay } => {
                    warn!(
                        attempt,
                        delay_secs = delay.as_secs(),
                        "Another instance is polling with this token, restarting later"
                    );
                    tokio::time::sleep(delay).await;
                }
                PollState::Stopped if outcome == RunOutcome::Conflict => {
                    error!(
                        retries = self.policy.max_retries,
                        "Polling conflict persists, giving up"
                    );
                    return Err(TelegramError::BotStartFailed(
                        "polling conflict retries exhausted".to_string(),
                    ));
                }
                PollState::Stopped | PollState::Polling => {
                    info!("Telegram bot stopped");
                    return Ok(());
                }
            }
        }
    }

    /// Runs one dispatcher until it stops; reports whether it stopped on a
    /// conflict and whether any update was handled.
    async fn run_dispatcher(&self) -> (RunOutcome, bool) {
        let received = Arc::new(AtomicBool::new(false));
        let conflict = Arc::new(AtomicBool::new(false));

        let mut dispatcher = Dispatcher::builder(
            self.bot.clone(),
            schema(Arc::clone(&self.factory), Arc::clone(&received)),
        )
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

        let token = dispatcher.shutdown_token();
        let conflict_flag = Arc::clone(&conflict);
        let error_handler = Arc::new(move |err: RequestError| {
            if matches!(err, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                if !conflict_flag.swap(true, Ordering::SeqCst) {
                    warn!("getUpdates conflict, stopping dispatcher");
                    // Already shutting down when this fails.
                    let _ = token.shutdown();
                }
            } else {
                warn!(error = %err, "Update listener error");
            }
            async {}
        });

        let listener = update_listeners::polling_default(self.bot.clone()).await;
        dispatcher
            .dispatch_with_listener(listener, error_handler)
            .await;

        let outcome = if conflict.load(Ordering::SeqCst) {
            RunOutcome::Conflict
        } else {
            RunOutcome::Finished
        };
        (outcome, received.load(Ordering::SeqCst))
    }
}

/// Update routing: commands, unknown commands, then plain text.
fn schema(factory: Arc<Factory>, received: Arc<AtomicBool>) -> UpdateHandler<RequestError> {
    let factory_for_commands = Arc::clone(&factory);
    let factory_for_messages = factory;

    dptree::entry()
        .inspect(move |_: Update| {
            received.store(true, Ordering::Relaxed);
        })
        .branch(
            Update::filter_message()
                .filter_map(|msg: Message, me: Me| {
                    msg.text().and_then(|text| parse_command(text, me.username()))
                })
                .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                    let factory = Arc::clone(&factory_for_commands);
                    info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                    async move { handle_command(bot, msg, cmd, factory).await }
                }),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message, me: Me| {
                    msg.text()
                        .map(|t| is_unknown_command(t, me.username()))
                        .unwrap_or(false)
                })
                .endpoint(|bot: Bot, msg: Message| async move {
                    if let Some(text) = msg.text() {
                        info!(cmd = %text, "Unrecognized command");
                        bot.send_message(
                            msg.chat.id,
                            format!(
                                "Unknown command: {}\n\nUse /help to see available commands.",
                                text.split_whitespace().next().unwrap_or(text)
                            ),
                        )
                        .await?;
                    }
                    Ok(())
                }),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| {
                    msg.text()
                        .map(|t| !t.starts_with('/'))
                        .unwrap_or(false)
                })
                .endpoint(move |bot: Bot, msg: Message| {
                    let factory = Arc::clone(&factory_for_messages);
                    debug!(chat_id = %msg.chat.id, "Text message received");
                    // Detached from the chat's update queue.
                    tokio::spawn(async move {
                        if let Err(e) = handle_message(bot, msg, factory).await {
                            error!(error = %e, "Failed to handle message");
                        }
                    });
                    async { Ok::<(), RequestError>(()) }
                }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use appfactory_core::FactoryConfig;

    #[test]
    fn test_new_requires_token() {
        let factory = Arc::new(Factory::new(FactoryConfig::default()));
        assert!(matches!(TelegramBot::new(factory), Err(TelegramError::NoToken)));
    }

    #[test]
    fn test_new_with_token() {
        let mut config = FactoryConfig::default();
        config.telegram_token = Some("123:abc".to_string());
        let factory = Arc::new(Factory::new(config));

        let policy = ReconnectPolicy {
            max_retries: 2,
            ..ReconnectPolicy::default()
        };
        let bot = TelegramBot::new(factory).unwrap().with_policy(policy.clone());
        assert_eq!(bot.policy, policy);
    }
}
