//! /start handler
//!
//! Known users get the main menu back (plus an opportunistic birthday
//! check); unknown users enter the registration flow. The referral
//! start-parameter is parked in the conversation context and only
//! becomes a credit once registration completes.

use std::sync::Arc;
use chrono::Utc;
use teloxide::prelude::*;
use tracing::info;

use crate::handlers::keyboards;
use crate::services::bonus::BonusService;
use crate::services::ServiceFactory;
use crate::state::{ConversationContext, ConversationState, StateStorage};
use crate::utils::errors::Result;
use crate::utils::validation::first_name;

pub async fn handle_start(
    bot: Bot,
    msg: Message,
    start_arg: String,
    services: Arc<ServiceFactory>,
    storage: StateStorage,
) -> Result<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = from.id.0 as i64;

    // A command aborts whatever flow was in progress
    storage.delete_context(user_id).await;

    if let Some(user) = services.ledger.users.find_by_user_id(user_id).await? {
        services.ledger.users.update_last_activity(user_id).await?;
        services
            .bonus
            .check_user_birthday(&user, Utc::now().date_naive(), &services.notification)
            .await?;

        bot.send_message(
            msg.chat.id,
            format!("Welcome back, {}! 👋", first_name(&user.full_name)),
        )
        .reply_markup(keyboards::user_menu())
        .await?;
        return Ok(());
    }

    let mut context = ConversationContext::new(user_id);
    context.begin(ConversationState::AwaitingFullName);
    if let Some(referrer) = BonusService::parse_referrer(&start_arg, user_id) {
        info!(user_id = user_id, referrer = referrer, "Registration started via referral link");
        context.set_data("invited_by", referrer)?;
    }
    storage.save_context(&context).await;

    bot.send_message(
        msg.chat.id,
        "Welcome to our bonus club! 🎉\n\n\
         To register, please send your full name (first and last name).",
    )
    .await?;
    Ok(())
}
