//! Configuration module

pub mod settings;
pub mod validation;

pub use settings::{Settings, BotConfig, DatabaseConfig, BonusConfig, LoggingConfig};
