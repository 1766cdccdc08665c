//! Promotion repository

use chrono::Utc;
use crate::database::connection::DatabasePool;
use crate::models::promotion::{Promotion, CreatePromotionRequest};
use crate::utils::errors::BonusClubError;

/// Outcome of deleting a row by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: DatabasePool,
}

impl PromotionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreatePromotionRequest) -> Result<Promotion, BonusClubError> {
        let promotion = sqlx::query_as::<_, Promotion>(
            r#"
            INSERT INTO promotions (title, description, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, is_active, created_at
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(promotion)
    }

    /// Promotions shown to end users
    pub async fn active(&self) -> Result<Vec<Promotion>, BonusClubError> {
        let promotions = sqlx::query_as::<_, Promotion>(
            "SELECT * FROM promotions WHERE is_active = 1 ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(promotions)
    }

    /// Every promotion, for the admin delete list
    pub async fn all(&self) -> Result<Vec<Promotion>, BonusClubError> {
        let promotions = sqlx::query_as::<_, Promotion>("SELECT * FROM promotions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(promotions)
    }

    pub async fn delete(&self, id: i64) -> Result<DeleteOutcome, BonusClubError> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
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
