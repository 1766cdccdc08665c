//! Data models

pub mod user;
pub mod transaction;
pub mod promotion;
pub mod bonus_word;

pub use user::{User, UserSummary, CreateUserRequest};
pub use transaction::{BonusTransaction, Operation};
pub use promotion::{Promotion, CreatePromotionRequest};
pub use bonus_word::BonusWord;
