//! Bonus transaction model
//!
//! Transactions are append-only: once a row exists it is never updated or
//! deleted, and the user's running balance is adjusted in the same atomic
//! unit as the insert.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Direction of a balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BonusTransaction {
    pub id: i64,
    pub user_id: i64,
    /// Always positive; the sign comes from `operation`
    pub amount: i64,
    pub operation: Operation,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl BonusTransaction {
    /// Amount with the operation's sign applied
    pub fn signed_amount(&self) -> i64 {
        match self.operation {
            Operation::Add => self.amount,
            Operation::Subtract => -self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_amount() {
        let tx = BonusTransaction {
            id: 1,
            user_id: 100,
            amount: 150,
            operation: Operation::Subtract,
            description: String::new(),
            created_at: Utc::now(),
        };
        assert_eq!(tx.signed_amount(), -150);
    }
}
