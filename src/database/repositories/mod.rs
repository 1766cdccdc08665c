//! Repository implementations

pub mod user;
pub mod promotion;
pub mod bonus_word;

pub use user::{UserRepository, CreateUserOutcome, PostTransactionOutcome};
pub use promotion::{PromotionRepository, DeleteOutcome};
pub use bonus_word::{BonusWordRepository, CreateWordOutcome, UpdateWordOutcome};
