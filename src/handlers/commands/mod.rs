//! Command handlers

pub mod start;
pub mod admin;

use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::error;

use crate::services::ServiceFactory;
use crate::state::StateStorage;
use crate::utils::errors::Result;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Register or open the main menu; carries the referral start-parameter
    #[command(description = "start the bot")]
    Start(String),
    /// Admin panel, restricted to the configured administrator
    #[command(description = "open the admin panel")]
    Admin,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    command: Command,
    services: Arc<ServiceFactory>,
    storage: StateStorage,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let result = match command {
        Command::Start(arg) => start::handle_start(bot.clone(), msg, arg, services, storage).await,
        Command::Admin => admin::handle_admin(bot.clone(), msg, services, storage).await,
    };

    // Failures stop this update only; the dispatch loop keeps running and
    // the sender gets a generic transient-error message.
    if let Err(e) = result {
        error!(error = %e, recoverable = e.is_recoverable(), "Command handler failed");
        let _ = bot
            .send_message(chat_id, "Something went wrong. Please try again.")
            .await;
    }
    Ok(())
}
