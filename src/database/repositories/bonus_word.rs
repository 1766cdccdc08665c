//! Redemption codeword repository
//!
//! Words are stored uppercase and must stay unique; the conflict surfaces
//! as an outcome, not an error.

use chrono::Utc;
use crate::database::connection::DatabasePool;
use crate::database::repositories::promotion::DeleteOutcome;
use crate::models::bonus_word::BonusWord;
use crate::utils::errors::BonusClubError;

/// Outcome of inserting a codeword
#[derive(Debug)]
pub enum CreateWordOutcome {
    Created(BonusWord),
    AlreadyExists,
}

/// Outcome of renaming a codeword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateWordOutcome {
    Updated,
    NotFound,
    DuplicateWord,
}

#[derive(Debug, Clone)]
pub struct BonusWordRepository {
    pool: DatabasePool,
}

impl BonusWordRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Insert a codeword. Case normalization happens here too, so a caller
    /// bypassing `utils::validation::normalize_bonus_word` still cannot
    /// store a mixed-case word.
    pub async fn create(&self, word: &str) -> Result<CreateWordOutcome, BonusClubError> {
        let word = word.to_uppercase();
        let inserted = sqlx::query_as::<_, BonusWord>(
            r#"
            INSERT INTO bonus_words (word, created_at)
            VALUES ($1, $2)
            RETURNING id, word, is_active, created_at
            "#,
        )
        .bind(&word)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(CreateWordOutcome::Created(row)),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(CreateWordOutcome::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All configured words, alphabetical
    pub async fn all(&self) -> Result<Vec<BonusWord>, BonusClubError> {
        let words = sqlx::query_as::<_, BonusWord>("SELECT * FROM bonus_words ORDER BY word")
            .fetch_all(&self.pool)
            .await?;

        Ok(words)
    }

    /// Words eligible for random selection at redemption
    pub async fn active_words(&self) -> Result<Vec<String>, BonusClubError> {
        let words: Vec<(String,)> =
            sqlx::query_as("SELECT word FROM bonus_words WHERE is_active = 1")
                .fetch_all(&self.pool)
                .await?;

        Ok(words.into_iter().map(|(w,)| w).collect())
    }

    pub async fn update(&self, id: i64, new_word: &str) -> Result<UpdateWordOutcome, BonusClubError> {
        let new_word = new_word.to_uppercase();
        let result = sqlx::query("UPDATE bonus_words SET word = $1 WHERE id = $2")
            .bind(&new_word)
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => Ok(UpdateWordOutcome::NotFound),
            Ok(_) => Ok(UpdateWordOutcome::Updated),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(UpdateWordOutcome::DuplicateWord)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<DeleteOutcome, BonusClubError> {
        let result = sqlx::query("DELETE FROM bonus_words WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            Ok(DeleteOutcome::NotFound)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }
}
