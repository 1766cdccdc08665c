//! Redemption codeword model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BonusWord {
    pub id: i64,
    /// Stored uppercase; unique across the table
    pub word: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
