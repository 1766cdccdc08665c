//! Callback query dispatch
//!
//! Every inline keyboard in this bot belongs to the admin panel, so the
//! admin gate runs before any state is even looked at. The query is
//! acknowledged first in all cases to stop the client spinner.
//!
//! State-scoped data (delete_promo, manage_user, user_action, edit_word,
//! del_word) resolves against the current conversation state; the words:*
//! menu entries and "cancel" are global.

use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tracing::{debug, error, warn};

use crate::handlers::keyboards;
use crate::models::transaction::Operation;
use crate::services::ServiceFactory;
use crate::state::{ConversationContext, ConversationState, StateStorage};
use crate::database::repositories::DeleteOutcome;
use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;

pub async fn handle_callback(
    bot: Bot,
    query: CallbackQuery,
    services: Arc<ServiceFactory>,
    storage: StateStorage,
) -> Result<()> {
    let chat_id = query.message.as_ref().map(|m| m.chat().id);
    if let Err(e) = process_callback(bot.clone(), query, services, storage).await {
        error!(error = %e, recoverable = e.is_recoverable(), "Callback handler failed");
        if let Some(chat_id) = chat_id {
            let _ = bot
                .send_message(chat_id, "Something went wrong. Please try again.")
                .await;
        }
    }
    Ok(())
}

async fn process_callback(
    bot: Bot,
    query: CallbackQuery,
    services: Arc<ServiceFactory>,
    storage: StateStorage,
) -> Result<()> {
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let Some(chat_id) = query.message.as_ref().map(|m| m.chat().id) else {
        return Ok(());
    };
    let user_id = query.from.id.0 as i64;

    if !services.auth.is_admin(user_id) {
        warn!(user_id = user_id, data = data, "Callback from non-admin ignored");
        return Ok(());
    }

    let context = storage
        .load_context(user_id)
        .await
        .unwrap_or_else(|| ConversationContext::new(user_id));

    // State-scoped callbacks take precedence over the global ones
    if let Some(state) = context.state {
        let handled = handle_state_callback(
            &bot, chat_id, user_id, data, state, context.clone(), &services, &storage,
        )
        .await?;
        if handled {
            return Ok(());
        }
    }

    handle_global_callback(&bot, chat_id, user_id, data, context, &services, &storage).await
}

/// Returns whether the callback matched the current state. An unmatched
/// callback falls through to the global set.
#[allow(clippy::too_many_arguments)]
async fn handle_state_callback(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    data: &str,
    state: ConversationState,
    mut context: ConversationContext,
    services: &ServiceFactory,
    storage: &StateStorage,
) -> Result<bool> {
    use ConversationState::*;

    match state {
        DeletePromotion => {
            let Some(id) = data.strip_prefix("delete_promo:").and_then(|s| s.parse::<i64>().ok())
            else {
                return Ok(false);
            };
            storage.delete_context(user_id).await;
            match services.ledger.promotions.delete(id).await? {
                DeleteOutcome::Deleted => {
                    log_admin_action(user_id, "delete_promotion", Some(id));
                    bot.send_message(chat_id, "🗑 Promotion deleted.")
                        .reply_markup(keyboards::admin_menu())
                        .await?;
                }
                DeleteOutcome::NotFound => {
                    bot.send_message(chat_id, "That promotion is already gone.")
                        .reply_markup(keyboards::admin_menu())
                        .await?;
                }
            }
        }

        ManageUserSelect => {
            let Some(managed_id) = data.strip_prefix("manage_user:").and_then(|s| s.parse::<i64>().ok())
            else {
                return Ok(false);
            };
            let Some(user) = services.ledger.users.find_by_user_id(managed_id).await? else {
                storage.delete_context(user_id).await;
                bot.send_message(chat_id, "That user no longer exists.")
                    .reply_markup(keyboards::admin_menu())
                    .await?;
                return Ok(true);
            };
            context.set_data("managed_user_id", managed_id)?;
            context.advance(ManageUserAction)?;
            storage.save_context(&context).await;
            bot.send_message(
                chat_id,
                format!(
                    "👤 {}\nBalance: {} points\n\nWhat would you like to do?",
                    user.full_name, user.bonus_balance
                ),
            )
            .reply_markup(keyboards::user_action_keyboard())
            .await?;
        }

        ManageUserAction => {
            let Some(action) = data.strip_prefix("user_action:") else {
                return Ok(false);
            };
            match action {
                "back" => {
                    let users = services.ledger.users.list().await?;
                    context.begin(ManageUserSelect);
                    storage.save_context(&context).await;
                    bot.send_message(chat_id, "Pick a user to manage:")
                        .reply_markup(keyboards::users_keyboard(&users))
                        .await?;
                }
                "add" | "subtract" => {
                    let verb = match action {
                        "add" => Operation::Add.as_str(),
                        _ => Operation::Subtract.as_str(),
                    };
                    context.set_data("operation", verb)?;
                    context.advance(ManageUserAmount)?;
                    storage.save_context(&context).await;
                    bot.send_message(chat_id, "Enter the amount of points:")
                        .reply_markup(keyboards::back_to_menu())
                        .await?;
                }
                other => {
                    debug!(action = other, "Unknown user action");
                    return Ok(false);
                }
            }
        }

        EditBonusWordSelect => {
            let Some(id) = data.strip_prefix("edit_word:").and_then(|s| s.parse::<i64>().ok())
            else {
                return Ok(false);
            };
            context.set_data("word_id", id)?;
            context.advance(EditBonusWordNew)?;
            storage.save_context(&context).await;
            bot.send_message(chat_id, "Send the new codeword (letters only, at least 3).")
                .reply_markup(keyboards::back_to_menu())
                .await?;
        }

        DeleteBonusWord => {
            let Some(id) = data.strip_prefix("del_word:").and_then(|s| s.parse::<i64>().ok())
            else {
                return Ok(false);
            };
            storage.delete_context(user_id).await;
            match services.ledger.bonus_words.delete(id).await? {
                DeleteOutcome::Deleted => {
                    log_admin_action(user_id, "delete_bonus_word", Some(id));
                    bot.send_message(chat_id, "🗑 Codeword deleted.")
                        .reply_markup(keyboards::admin_menu())
                        .await?;
                }
                DeleteOutcome::NotFound => {
                    bot.send_message(chat_id, "That codeword is already gone.")
                        .reply_markup(keyboards::admin_menu())
                        .await?;
                }
            }
        }

        _ => return Ok(false),
    }

    Ok(true)
}

async fn handle_global_callback(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    data: &str,
    mut context: ConversationContext,
    services: &ServiceFactory,
    storage: &StateStorage,
) -> Result<()> {
    match data {
        "cancel" => {
            storage.delete_context(user_id).await;
            bot.send_message(chat_id, "Cancelled.")
                .reply_markup(keyboards::admin_menu())
                .await?;
        }

        "words:add" => {
            context.begin(ConversationState::AddBonusWord);
            storage.save_context(&context).await;
            bot.send_message(chat_id, "Send the new codeword (letters only, at least 3).")
                .reply_markup(keyboards::back_to_menu())
                .await?;
        }

        "words:edit" => {
            let words = services.ledger.bonus_words.all().await?;
            if words.is_empty() {
                bot.send_message(chat_id, "No codewords configured yet.").await?;
                return Ok(());
            }
            context.begin(ConversationState::EditBonusWordSelect);
            storage.save_context(&context).await;
            bot.send_message(chat_id, "Which codeword should be changed?")
                .reply_markup(keyboards::words_pick_keyboard(&words, "edit_word"))
                .await?;
        }

        "words:delete" => {
            let words = services.ledger.bonus_words.all().await?;
            if words.is_empty() {
                bot.send_message(chat_id, "No codewords configured yet.").await?;
                return Ok(());
            }
            context.begin(ConversationState::DeleteBonusWord);
            storage.save_context(&context).await;
            bot.send_message(chat_id, "Which codeword should be deleted?")
                .reply_markup(keyboards::words_pick_keyboard(&words, "del_word"))
                .await?;
        }

        "words:back" => {
            storage.delete_context(user_id).await;
            bot.send_message(chat_id, "🔧 Admin panel")
                .reply_markup(keyboards::admin_menu())
                .await?;
        }

        other => {
            debug!(user_id = user_id, data = other, "Unhandled callback ignored");
        }
    }

    Ok(())
}
