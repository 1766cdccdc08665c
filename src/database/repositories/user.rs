//! User and bonus-transaction repository
//!
//! Users and their transaction log are managed together because every
//! balance mutation must pair a transaction insert with the balance update
//! in one atomic unit. The balance column is derived: it always equals the
//! signed sum of the user's transactions.
//!
//! Expected conflicts (duplicate registration, missing user) surface as
//! outcome enums; only real storage failures come back as errors.

use chrono::Utc;
use sqlx::Sqlite;
use crate::database::connection::DatabasePool;
use crate::models::user::{User, UserSummary, CreateUserRequest};
use crate::models::transaction::{BonusTransaction, Operation};
use crate::utils::errors::BonusClubError;

/// Outcome of a registration attempt
#[derive(Debug)]
pub enum CreateUserOutcome {
    /// User row inserted; registration bonus posted; referral bonus posted
    /// to the inviter when one was resolvable.
    Created { user: User, referral_credited: bool },
    /// The external id is already registered. Nothing was written.
    AlreadyExists,
}

/// Outcome of posting a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTransactionOutcome {
    Posted { new_balance: i64 },
    UserNotFound,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DatabasePool,
}

impl UserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Register a new user. In one transaction: insert the user row, post
    /// the registration bonus, and, if `invited_by` resolves to an existing
    /// user, post the referral bonus to the inviter. A duplicate id rolls
    /// everything back and reports `AlreadyExists`.
    pub async fn create(
        &self,
        request: CreateUserRequest,
        registration_bonus: i64,
        referral_bonus: i64,
    ) -> Result<CreateUserOutcome, BonusClubError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (user_id, full_name, birth_date, invited_by, registration_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(request.user_id)
        .bind(&request.full_name)
        .bind(&request.birth_date)
        .bind(request.invited_by)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            return match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => Ok(CreateUserOutcome::AlreadyExists),
                other => Err(other.into()),
            };
        }

        Self::post_in_tx(
            &mut tx,
            request.user_id,
            registration_bonus,
            Operation::Add,
            "Registration bonus",
        )
        .await?;

        let mut referral_credited = false;
        if let Some(inviter_id) = request.invited_by {
            // Credit only when the inviter actually exists; a dangling
            // reference silently skips the referral bonus.
            let outcome = Self::post_in_tx(
                &mut tx,
                inviter_id,
                referral_bonus,
                Operation::Add,
                &format!("Referral bonus for inviting {}", request.user_id),
            )
            .await?;
            referral_credited = matches!(outcome, PostTransactionOutcome::Posted { .. });
        }

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(request.user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CreateUserOutcome::Created { user, referral_credited })
    }

    /// Find a user by external id
    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Option<User>, BonusClubError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Append a transaction and adjust the balance in one atomic unit.
    /// No overdraft check happens here: subtract validation belongs to the
    /// caller, this is the low-level mutator.
    pub async fn post_transaction(
        &self,
        user_id: i64,
        amount: i64,
        operation: Operation,
        description: &str,
    ) -> Result<PostTransactionOutcome, BonusClubError> {
        if amount <= 0 {
            return Err(BonusClubError::InvalidInput(format!(
                "transaction amount must be positive, got {amount}"
            )));
        }

        let mut tx = self.pool.begin().await?;
        let outcome = Self::post_in_tx(&mut tx, user_id, amount, operation, description).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn post_in_tx(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        user_id: i64,
        amount: i64,
        operation: Operation,
        description: &str,
    ) -> Result<PostTransactionOutcome, BonusClubError> {
        let signed = match operation {
            Operation::Add => amount,
            Operation::Subtract => -amount,
        };

        let updated: Option<(i64,)> = sqlx::query_as(
            "UPDATE users SET bonus_balance = bonus_balance + $1 WHERE user_id = $2 RETURNING bonus_balance",
        )
        .bind(signed)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

        let Some((new_balance,)) = updated else {
            return Ok(PostTransactionOutcome::UserNotFound);
        };

        sqlx::query(
            r#"
            INSERT INTO bonus_transactions (user_id, amount, operation, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(operation.as_str())
        .bind(description)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        Ok(PostTransactionOutcome::Posted { new_balance })
    }

    /// All users in insertion order, as compact summaries
    pub async fn list(&self) -> Result<Vec<UserSummary>, BonusClubError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT user_id, full_name, bonus_balance FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Full transaction log for a user, oldest first
    pub async fn transactions(&self, user_id: i64) -> Result<Vec<BonusTransaction>, BonusClubError> {
        let transactions = sqlx::query_as::<_, BonusTransaction>(
            "SELECT * FROM bonus_transactions WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Touch the activity timestamp
    pub async fn update_last_activity(&self, user_id: i64) -> Result<(), BonusClubError> {
        sqlx::query("UPDATE users SET last_activity = $1 WHERE user_id = $2")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Users whose stored birth date starts with the given "DD.MM" prefix
    pub async fn find_birthday_users(&self, day_month: &str) -> Result<Vec<User>, BonusClubError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE substr(birth_date, 1, 5) = $1 ORDER BY id",
        )
        .bind(day_month)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Post the birthday bonus for `year` at most once. The year guard, the
    /// transaction insert and the balance update commit together; a second
    /// call in the same year is a no-op returning false.
    pub async fn claim_birthday_bonus(
        &self,
        user_id: i64,
        year: i32,
        amount: i64,
    ) -> Result<bool, BonusClubError> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE users SET last_birthday_bonus_year = $1
            WHERE user_id = $2
              AND (last_birthday_bonus_year IS NULL OR last_birthday_bonus_year <> $1)
            "#,
        )
        .bind(year)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            return Ok(false);
        }

        Self::post_in_tx(&mut tx, user_id, amount, Operation::Add, "Birthday bonus").await?;
        tx.commit().await?;
        Ok(true)
    }
}
