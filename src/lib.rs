//! BonusClub Telegram Bot
//!
//! A loyalty-program bot: an append-only bonus ledger with derived
//! balances, multi-turn registration and redemption flows, referral and
//! birthday bonuses, and an admin panel for promotions, codewords,
//! balance adjustments and broadcasts.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{BonusClubError, Result};

// Re-export main components for easy access
pub use database::LedgerService;
pub use services::ServiceFactory;
pub use state::{ConversationContext, ConversationState, StateStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
