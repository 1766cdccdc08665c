//! Keyboard layouts and menu labels
//!
//! Menu buttons arrive back as plain text, so the labels double as the
//! dispatcher's fixed-label match targets. Keep them in one place.

use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};
use crate::models::{BonusWord, Promotion, UserSummary};

// User menu
pub const BTN_BALANCE: &str = "💰 My balance";
pub const BTN_INVITE: &str = "📢 Invite a friend";
pub const BTN_PROMOTIONS: &str = "🎁 Promotions";
pub const BTN_REDEEM: &str = "💸 Redeem bonuses";
pub const BTN_BACK_TO_MENU: &str = "🔙 Back to menu";

// Admin menu
pub const BTN_ADD_PROMOTION: &str = "📢 Add promotion";
pub const BTN_DELETE_PROMOTION: &str = "🗑 Delete promotion";
pub const BTN_BONUS_WORDS: &str = "🔑 Bonus words";
pub const BTN_MANAGE_USERS: &str = "👥 Manage users";
pub const BTN_BROADCAST: &str = "📩 Broadcast";
pub const BTN_EXIT_ADMIN: &str = "🔙 Exit admin panel";

/// Main menu shown to registered users
pub fn user_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_BALANCE)],
        vec![KeyboardButton::new(BTN_INVITE)],
        vec![KeyboardButton::new(BTN_PROMOTIONS)],
    ])
    .resize_keyboard()
    .input_field_placeholder("Choose an action")
}

/// Admin panel menu
pub fn admin_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(BTN_ADD_PROMOTION),
            KeyboardButton::new(BTN_DELETE_PROMOTION),
        ],
        vec![
            KeyboardButton::new(BTN_BONUS_WORDS),
            KeyboardButton::new(BTN_MANAGE_USERS),
        ],
        vec![KeyboardButton::new(BTN_BROADCAST)],
        vec![KeyboardButton::new(BTN_EXIT_ADMIN)],
    ])
    .resize_keyboard()
}

/// Single escape-hatch button shown during multi-turn flows
pub fn back_to_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(BTN_BACK_TO_MENU)]]).resize_keyboard()
}

/// Balance view with the redeem entry point
pub fn balance_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_REDEEM)],
        vec![KeyboardButton::new(BTN_BACK_TO_MENU)],
    ])
    .resize_keyboard()
}

/// One delete button per promotion
pub fn promotions_delete_keyboard(promotions: &[Promotion]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = promotions
        .iter()
        .map(|p| {
            vec![InlineKeyboardButton::callback(
                format!("❌ {}", p.title),
                format!("delete_promo:{}", p.id),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

/// One button per user for the admin management list
pub fn users_keyboard(users: &[UserSummary]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = users
        .iter()
        .map(|u| {
            vec![InlineKeyboardButton::callback(
                format!("{} ({} pts)", u.full_name, u.bonus_balance),
                format!("manage_user:{}", u.user_id),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

/// Credit/debit choice for a selected user
pub fn user_action_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("➕ Credit bonuses", "user_action:add"),
            InlineKeyboardButton::callback("➖ Debit bonuses", "user_action:subtract"),
        ],
        vec![InlineKeyboardButton::callback("🔙 Back", "user_action:back")],
    ])
}

/// Codeword management entry menu
pub fn words_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("➕ Add", "words:add"),
            InlineKeyboardButton::callback("✏️ Edit", "words:edit"),
            InlineKeyboardButton::callback("🗑 Delete", "words:delete"),
        ],
        vec![InlineKeyboardButton::callback("🔙 Back", "words:back")],
    ])
}

/// Pick-a-word list; `action` is the callback prefix (edit_word/del_word)
pub fn words_pick_keyboard(words: &[BonusWord], action: &str) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = words
        .iter()
        .map(|w| {
            vec![InlineKeyboardButton::callback(
                w.word.clone(),
                format!("{action}:{}", w.id),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("🔙 Cancel", "cancel")]);
    InlineKeyboardMarkup::new(rows)
}
