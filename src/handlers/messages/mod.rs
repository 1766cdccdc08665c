//! Text message dispatch
//!
//! Plain text resolves in a fixed order: escape-hatch labels first (they
//! clear state no matter where the user is), then the handler for the
//! user's current conversation state, then role-gated menu labels, and
//! anything left over is ignored. Invalid input inside a flow re-prompts
//! and leaves the state untouched, so the user can simply try again.

use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tracing::{debug, error, warn};

use crate::handlers::keyboards::{self, *};
use crate::models::promotion::CreatePromotionRequest;
use crate::models::transaction::Operation;
use crate::services::bonus::{AdjustmentOutcome, RedemptionOutcome, RegistrationOutcome};
use crate::services::ServiceFactory;
use crate::state::{ConversationContext, ConversationState, StateStorage};
use crate::database::repositories::{CreateWordOutcome, UpdateWordOutcome};
use crate::utils::errors::Result;
use crate::utils::validation;

pub async fn handle_message(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    storage: StateStorage,
) -> Result<()> {
    let chat_id = msg.chat.id;
    if let Err(e) = dispatch_text(bot.clone(), msg, services, storage).await {
        error!(error = %e, recoverable = e.is_recoverable(), "Message handler failed");
        let _ = bot
            .send_message(chat_id, "Something went wrong. Please try again.")
            .await;
    }
    Ok(())
}

async fn dispatch_text(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    storage: StateStorage,
) -> Result<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let user_id = from.id.0 as i64;
    let chat_id = msg.chat.id;
    let text = text.trim();

    // Escape hatches work from any state
    if text == BTN_BACK_TO_MENU {
        storage.delete_context(user_id).await;
        bot.send_message(chat_id, "Main menu")
            .reply_markup(keyboards::user_menu())
            .await?;
        return Ok(());
    }
    if text == BTN_EXIT_ADMIN {
        storage.delete_context(user_id).await;
        bot.send_message(chat_id, "Left the admin panel")
            .reply_markup(keyboards::user_menu())
            .await?;
        return Ok(());
    }

    if let Some(context) = storage.load_context(user_id).await {
        if let Some(state) = context.state {
            return handle_state_input(&bot, chat_id, user_id, text, state, context, &services, &storage)
                .await;
        }
    }

    handle_menu_label(&bot, chat_id, user_id, text, &services, &storage).await
}

#[allow(clippy::too_many_arguments)]
async fn handle_state_input(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    text: &str,
    state: ConversationState,
    mut context: ConversationContext,
    services: &ServiceFactory,
    storage: &StateStorage,
) -> Result<()> {
    use ConversationState::*;

    // Admin flows never belong to a non-admin context; drop it if one
    // slips through.
    if state.is_admin_flow() && !services.auth.is_admin(user_id) {
        warn!(user_id = user_id, state = ?state, "Admin flow state on non-admin user, clearing");
        storage.delete_context(user_id).await;
        return Ok(());
    }

    match state {
        AwaitingFullName => {
            let Some(full_name) = validation::parse_full_name(text) else {
                bot.send_message(
                    chat_id,
                    "Please send your first and last name separated by a space.",
                )
                .await?;
                return Ok(());
            };
            context.set_data("full_name", full_name)?;
            context.advance(AwaitingBirthDate)?;
            storage.save_context(&context).await;
            bot.send_message(
                chat_id,
                "Great! Now send your birth date in DD.MM.YYYY format, e.g. 15.05.1990.",
            )
            .await?;
        }

        AwaitingBirthDate => {
            if validation::parse_birth_date(text).is_none() {
                bot.send_message(
                    chat_id,
                    "That does not look like a date. Please use DD.MM.YYYY, e.g. 15.05.1990.",
                )
                .await?;
                return Ok(());
            }
            let full_name = context.get_string("full_name").unwrap_or_default();
            let invited_by = context.get_i64("invited_by");

            match services.bonus.register(user_id, &full_name, text, invited_by).await? {
                RegistrationOutcome::Registered { user, referral_credited } => {
                    storage.delete_context(user_id).await;
                    bot.send_message(
                        chat_id,
                        format!(
                            "✅ Registration complete, {}!\n\
                             You received {} welcome bonus points.\n\
                             Your balance: {} points.",
                            validation::first_name(&user.full_name),
                            services.bonus.config().registration_bonus,
                            user.bonus_balance,
                        ),
                    )
                    .reply_markup(keyboards::user_menu())
                    .await?;

                    // Delivery failure must not undo the credit, so this
                    // goes through the fire-and-forget path.
                    if referral_credited {
                        if let Some(inviter) = invited_by {
                            let note = format!(
                                "🎉 {} joined using your invite link! You received {} bonus points.",
                                user.full_name,
                                services.bonus.config().referral_bonus,
                            );
                            services.notification.send_text(ChatId(inviter), &note).await;
                        }
                    }
                }
                RegistrationOutcome::AlreadyRegistered => {
                    storage.delete_context(user_id).await;
                    bot.send_message(chat_id, "You are already registered. 👋")
                        .reply_markup(keyboards::user_menu())
                        .await?;
                }
                RegistrationOutcome::InvalidFullName => {
                    // Stored name turned out unusable; restart the flow
                    context.begin(AwaitingFullName);
                    storage.save_context(&context).await;
                    bot.send_message(
                        chat_id,
                        "Let's start over. Please send your first and last name.",
                    )
                    .await?;
                }
                RegistrationOutcome::InvalidBirthDate => {
                    bot.send_message(
                        chat_id,
                        "That does not look like a date. Please use DD.MM.YYYY, e.g. 15.05.1990.",
                    )
                    .await?;
                }
            }
        }

        AwaitingRedeemAmount => {
            let Some(amount) = validation::parse_amount(text) else {
                bot.send_message(chat_id, "Please send a positive whole number.")
                    .await?;
                return Ok(());
            };
            match services.bonus.redeem(user_id, amount).await? {
                RedemptionOutcome::Redeemed { amount, new_balance, code_word } => {
                    storage.delete_context(user_id).await;
                    bot.send_message(
                        chat_id,
                        format!(
                            "✅ Redeemed {amount} points.\n\
                             Show this codeword at the counter: 🔑 {code_word}\n\
                             Remaining balance: {new_balance} points.",
                        ),
                    )
                    .reply_markup(keyboards::user_menu())
                    .await?;
                }
                RedemptionOutcome::InsufficientBalance { balance } => {
                    bot.send_message(
                        chat_id,
                        format!("Not enough points: your balance is {balance}. Enter a smaller amount."),
                    )
                    .await?;
                }
                RedemptionOutcome::UnknownUser => {
                    storage.delete_context(user_id).await;
                    bot.send_message(chat_id, "Please register first with /start.")
                        .await?;
                }
            }
        }

        AddPromotionTitle => {
            let Some(title) = validation::parse_promotion_title(text) else {
                bot.send_message(chat_id, "The title must be at least 5 characters. Try again.")
                    .await?;
                return Ok(());
            };
            context.set_data("title", title)?;
            context.advance(AddPromotionDescription)?;
            storage.save_context(&context).await;
            bot.send_message(chat_id, "Now send the promotion description.").await?;
        }

        AddPromotionDescription => {
            let title = context.get_string("title").unwrap_or_default();
            services
                .ledger
                .promotions
                .create(CreatePromotionRequest {
                    title: title.clone(),
                    description: text.to_string(),
                })
                .await?;
            storage.delete_context(user_id).await;
            bot.send_message(chat_id, format!("✅ Promotion \"{title}\" added."))
                .reply_markup(keyboards::admin_menu())
                .await?;
        }

        Broadcast => {
            let users = services.ledger.users.list().await?;
            let ids: Vec<i64> = users.iter().map(|u| u.user_id).collect();
            storage.delete_context(user_id).await;
            let report = services.notification.broadcast(&ids, text).await;
            bot.send_message(
                chat_id,
                format!(
                    "📩 Broadcast finished: {} delivered, {} failed.",
                    report.sent, report.failed
                ),
            )
            .reply_markup(keyboards::admin_menu())
            .await?;
        }

        ManageUserAmount => {
            let Some(amount) = validation::parse_amount(text) else {
                bot.send_message(chat_id, "Please send a positive whole number.")
                    .await?;
                return Ok(());
            };
            let Some(managed_id) = context.get_i64("managed_user_id") else {
                storage.delete_context(user_id).await;
                bot.send_message(chat_id, "Selection expired, start again from the user list.")
                    .reply_markup(keyboards::admin_menu())
                    .await?;
                return Ok(());
            };
            let operation = match context.get_string("operation").as_deref() {
                Some("subtract") => Operation::Subtract,
                _ => Operation::Add,
            };

            match services.bonus.adjust(user_id, managed_id, amount, operation).await? {
                AdjustmentOutcome::Adjusted { new_balance } => {
                    storage.delete_context(user_id).await;
                    bot.send_message(
                        chat_id,
                        format!("✅ Done. The user's balance is now {new_balance} points."),
                    )
                    .reply_markup(keyboards::admin_menu())
                    .await?;
                }
                AdjustmentOutcome::UnknownUser => {
                    storage.delete_context(user_id).await;
                    bot.send_message(chat_id, "That user no longer exists.")
                        .reply_markup(keyboards::admin_menu())
                        .await?;
                }
            }
        }

        AddBonusWord => {
            let Some(word) = validation::normalize_bonus_word(text) else {
                bot.send_message(
                    chat_id,
                    "Codewords are letters only, at least 3 characters. Try again.",
                )
                .await?;
                return Ok(());
            };
            match services.ledger.bonus_words.create(&word).await? {
                CreateWordOutcome::Created(created) => {
                    storage.delete_context(user_id).await;
                    bot.send_message(chat_id, format!("✅ Codeword added: {}", created.word))
                        .reply_markup(keyboards::admin_menu())
                        .await?;
                }
                CreateWordOutcome::AlreadyExists => {
                    bot.send_message(chat_id, "That word is already configured. Send a different one.")
                        .await?;
                }
            }
        }

        EditBonusWordNew => {
            let Some(word) = validation::normalize_bonus_word(text) else {
                bot.send_message(
                    chat_id,
                    "Codewords are letters only, at least 3 characters. Try again.",
                )
                .await?;
                return Ok(());
            };
            let Some(word_id) = context.get_i64("word_id") else {
                storage.delete_context(user_id).await;
                bot.send_message(chat_id, "Selection expired, start again from the word list.")
                    .reply_markup(keyboards::admin_menu())
                    .await?;
                return Ok(());
            };
            match services.ledger.bonus_words.update(word_id, &word).await? {
                UpdateWordOutcome::Updated => {
                    storage.delete_context(user_id).await;
                    bot.send_message(chat_id, format!("✅ Codeword updated to {word}."))
                        .reply_markup(keyboards::admin_menu())
                        .await?;
                }
                UpdateWordOutcome::DuplicateWord => {
                    bot.send_message(chat_id, "That word already exists. Send a different one.")
                        .await?;
                }
                UpdateWordOutcome::NotFound => {
                    storage.delete_context(user_id).await;
                    bot.send_message(chat_id, "That codeword no longer exists.")
                        .reply_markup(keyboards::admin_menu())
                        .await?;
                }
            }
        }

        // These steps advance via inline buttons; free text just re-prompts.
        DeletePromotion | ManageUserSelect | ManageUserAction | EditBonusWordSelect
        | DeleteBonusWord => {
            bot.send_message(chat_id, "Please use the buttons above.").await?;
        }
    }

    Ok(())
}

async fn handle_menu_label(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    text: &str,
    services: &ServiceFactory,
    storage: &StateStorage,
) -> Result<()> {
    match text {
        BTN_BALANCE => {
            let Some(user) = services.ledger.users.find_by_user_id(user_id).await? else {
                bot.send_message(chat_id, "Please register first with /start.").await?;
                return Ok(());
            };
            services.ledger.users.update_last_activity(user_id).await?;
            bot.send_message(
                chat_id,
                format!("💰 Your balance: {} points.", user.bonus_balance),
            )
            .reply_markup(keyboards::balance_menu())
            .await?;
        }

        BTN_INVITE => {
            let me = bot.get_me().await?;
            let link = format!("https://t.me/{}?start=ref_{}", me.username(), user_id);
            bot.send_message(
                chat_id,
                format!(
                    "📢 Invite a friend and earn {} points when they register!\n\
                     Your personal link:\n{link}",
                    services.bonus.config().referral_bonus,
                ),
            )
            .await?;
        }

        BTN_PROMOTIONS => {
            let promotions = services.ledger.promotions.active().await?;
            if promotions.is_empty() {
                bot.send_message(chat_id, "No active promotions right now. Check back soon! 🎁")
                    .await?;
            } else {
                let mut body = String::from("🎁 Current promotions:\n");
                for p in &promotions {
                    body.push_str(&format!("\n• {}\n{}\n", p.title, p.description));
                }
                bot.send_message(chat_id, body).await?;
            }
        }

        BTN_REDEEM => {
            let Some(user) = services.ledger.users.find_by_user_id(user_id).await? else {
                bot.send_message(chat_id, "Please register first with /start.").await?;
                return Ok(());
            };
            services.ledger.users.update_last_activity(user_id).await?;

            let mut context = ConversationContext::new(user_id);
            context.begin(ConversationState::AwaitingRedeemAmount);
            storage.save_context(&context).await;
            bot.send_message(
                chat_id,
                format!(
                    "Your balance: {} points.\nHow many points would you like to redeem?",
                    user.bonus_balance
                ),
            )
            .reply_markup(keyboards::back_to_menu())
            .await?;
        }

        BTN_ADD_PROMOTION if services.auth.is_admin(user_id) => {
            let mut context = ConversationContext::new(user_id);
            context.begin(ConversationState::AddPromotionTitle);
            storage.save_context(&context).await;
            bot.send_message(chat_id, "Send the promotion title.")
                .reply_markup(keyboards::back_to_menu())
                .await?;
        }

        BTN_DELETE_PROMOTION if services.auth.is_admin(user_id) => {
            let promotions = services.ledger.promotions.all().await?;
            if promotions.is_empty() {
                bot.send_message(chat_id, "There are no promotions to delete.").await?;
                return Ok(());
            }
            let mut context = ConversationContext::new(user_id);
            context.begin(ConversationState::DeletePromotion);
            storage.save_context(&context).await;
            bot.send_message(chat_id, "Which promotion should be deleted?")
                .reply_markup(keyboards::promotions_delete_keyboard(&promotions))
                .await?;
        }

        BTN_BONUS_WORDS if services.auth.is_admin(user_id) => {
            let words = services.ledger.bonus_words.all().await?;
            let listing = if words.is_empty() {
                "No codewords configured yet.".to_string()
            } else {
                let names: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
                format!("🔑 Configured codewords:\n{}", names.join(", "))
            };
            bot.send_message(chat_id, listing)
                .reply_markup(keyboards::words_menu_keyboard())
                .await?;
        }

        BTN_MANAGE_USERS if services.auth.is_admin(user_id) => {
            let users = services.ledger.users.list().await?;
            if users.is_empty() {
                bot.send_message(chat_id, "Nobody has registered yet.").await?;
                return Ok(());
            }
            let mut context = ConversationContext::new(user_id);
            context.begin(ConversationState::ManageUserSelect);
            storage.save_context(&context).await;
            bot.send_message(chat_id, "Pick a user to manage:")
                .reply_markup(keyboards::users_keyboard(&users))
                .await?;
        }

        BTN_BROADCAST if services.auth.is_admin(user_id) => {
            let mut context = ConversationContext::new(user_id);
            context.begin(ConversationState::Broadcast);
            storage.save_context(&context).await;
            bot.send_message(chat_id, "Send the message to broadcast to every user.")
                .reply_markup(keyboards::back_to_menu())
                .await?;
        }

        other => {
            debug!(user_id = user_id, text = other, "Unhandled text ignored");
        }
    }

    Ok(())
}
