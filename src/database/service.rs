//! Ledger service layer
//!
//! High-level facade over the repositories. This is the "ledger store"
//! boundary the rest of the application talks to: callers see outcome
//! enums, never driver-level errors for expected conflicts.

use rand::seq::SliceRandom;
use crate::database::connection::DatabasePool;
use crate::database::repositories::{UserRepository, PromotionRepository, BonusWordRepository};
use crate::utils::errors::BonusClubError;

#[derive(Debug, Clone)]
pub struct LedgerService {
    pub users: UserRepository,
    pub promotions: PromotionRepository,
    pub bonus_words: BonusWordRepository,
}

impl LedgerService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            promotions: PromotionRepository::new(pool.clone()),
            bonus_words: BonusWordRepository::new(pool),
        }
    }

    /// One active codeword chosen uniformly at random, or the configured
    /// default when the active set is empty.
    pub async fn random_active_word(&self, default_word: &str) -> Result<String, BonusClubError> {
        let words = self.bonus_words.active_words().await?;
        let word = words
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| default_word.to_string());
        Ok(word)
    }
}
