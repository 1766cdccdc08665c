//! Error handling for BonusClub
//!
//! This module defines the main error type used throughout the application.
//! Expected business outcomes (duplicate user, unknown promotion, rejected
//! redemption) are NOT errors here; store and service operations report those
//! through explicit outcome enums. `BonusClubError` covers the genuinely
//! exceptional paths: storage failures, transport failures, bad configuration.

use thiserror::Error;

/// Main error type for the BonusClub application
#[derive(Error, Debug)]
pub enum BonusClubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for BonusClub operations
pub type Result<T> = std::result::Result<T, BonusClubError>;

impl BonusClubError {
    /// Check if the error is recoverable. The dispatch loop keeps running
    /// either way; this drives log severity at the handler boundary.
    pub fn is_recoverable(&self) -> bool {
        match self {
            BonusClubError::Database(_) => false,
            BonusClubError::Migration(_) => false,
            BonusClubError::Telegram(_) => true,
            BonusClubError::Config(_) => false,
            BonusClubError::InvalidInput(_) => true,
            BonusClubError::InvalidStateTransition { .. } => true,
            BonusClubError::Serialization(_) => false,
            BonusClubError::Io(_) => true,
        }
    }
}
