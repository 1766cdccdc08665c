//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub bonus: BonusConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// The single configured administrator. Admin-only handlers are inert
    /// for any other sender.
    pub admin_id: i64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Bonus program configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BonusConfig {
    /// Points credited on completed registration
    pub registration_bonus: i64,
    /// Points credited to the inviter when an invited user registers
    pub referral_bonus: i64,
    /// Points credited once per calendar year on the user's birthday
    pub birthday_bonus: i64,
    /// Codeword revealed when no active codeword is configured
    pub default_code_word: String,
    /// Daily birthday sweep time, "HH:MM" in UTC
    pub sweep_time: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("BONUSCLUB").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::BonusClubError> {
        super::validation::validate_settings(self)
    }
}

impl BonusConfig {
    /// Parse the configured sweep time into (hour, minute), UTC.
    pub fn sweep_time_utc(&self) -> Option<(u32, u32)> {
        let (hour, minute) = self.sweep_time.split_once(':')?;
        let hour: u32 = hour.parse().ok()?;
        let minute: u32 = minute.parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some((hour, minute))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_id: 0,
            },
            database: DatabaseConfig {
                url: "sqlite://bonusclub.db".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            bonus: BonusConfig {
                registration_bonus: 100,
                referral_bonus: 100,
                birthday_bonus: 300,
                default_code_word: "BONUS".to_string(),
                sweep_time: "10:00".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/bonusclub".to_string(),
            },
        }
    }
}
