//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    /// External Telegram identity, unique and immutable
    pub user_id: i64,
    pub full_name: String,
    /// DD.MM.YYYY; validated as a real calendar date at registration
    pub birth_date: String,
    /// Derived column: always equals the signed sum of this user's
    /// transactions. Never written except alongside a transaction insert.
    pub bonus_balance: i64,
    /// Back-reference to the inviting user, set once at registration
    pub invited_by: Option<i64>,
    pub registration_date: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
    /// Guards the once-per-year birthday bonus
    pub last_birthday_bonus_year: Option<i32>,
}

impl User {
    /// Day and month of the stored birth date, for the birthday sweep.
    pub fn birth_day_month(&self) -> Option<(u32, u32)> {
        let mut parts = self.birth_date.split('.');
        let day: u32 = parts.next()?.parse().ok()?;
        let month: u32 = parts.next()?.parse().ok()?;
        Some((day, month))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub user_id: i64,
    pub full_name: String,
    pub birth_date: String,
    pub invited_by: Option<i64>,
}

/// Compact row for admin user listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub user_id: i64,
    pub full_name: String,
    pub bonus_balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_birth_day_month() {
        let user = User {
            id: 1,
            user_id: 100,
            full_name: "Ivan Petrov".to_string(),
            birth_date: "15.05.1990".to_string(),
            bonus_balance: 0,
            invited_by: None,
            registration_date: Utc::now(),
            last_activity: None,
            last_birthday_bonus_year: None,
        };
        assert_eq!(user.birth_day_month(), Some((15, 5)));
    }
}
