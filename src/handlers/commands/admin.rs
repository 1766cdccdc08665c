//! /admin handler

use std::sync::Arc;
use teloxide::prelude::*;
use tracing::warn;

use crate::handlers::keyboards;
use crate::services::ServiceFactory;
use crate::state::StateStorage;
use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;

pub async fn handle_admin(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    storage: StateStorage,
) -> Result<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = from.id.0 as i64;

    if !services.auth.is_admin(user_id) {
        warn!(user_id = user_id, "Admin command from non-admin user");
        bot.send_message(msg.chat.id, "This command is not available.")
            .await?;
        return Ok(());
    }

    storage.delete_context(user_id).await;
    log_admin_action(user_id, "open_admin_panel", None);

    bot.send_message(msg.chat.id, "🔧 Admin panel")
        .reply_markup(keyboards::admin_menu())
        .await?;
    Ok(())
}
