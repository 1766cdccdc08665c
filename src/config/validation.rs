//! Configuration validation

use crate::config::Settings;
use crate::utils::errors::{BonusClubError, Result};

/// Validate settings at startup, before anything connects anywhere.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.bot.token.is_empty() {
        return Err(BonusClubError::Config("bot.token must be set".to_string()));
    }
    if settings.bot.admin_id <= 0 {
        return Err(BonusClubError::Config("bot.admin_id must be a positive Telegram user id".to_string()));
    }
    if settings.database.url.is_empty() {
        return Err(BonusClubError::Config("database.url must be set".to_string()));
    }
    if settings.database.min_connections > settings.database.max_connections {
        return Err(BonusClubError::Config(
            "database.min_connections cannot exceed database.max_connections".to_string(),
        ));
    }
    if settings.bonus.registration_bonus <= 0
        || settings.bonus.referral_bonus <= 0
        || settings.bonus.birthday_bonus <= 0
    {
        return Err(BonusClubError::Config("bonus amounts must be positive".to_string()));
    }
    if crate::utils::validation::normalize_bonus_word(&settings.bonus.default_code_word).is_none() {
        return Err(BonusClubError::Config(
            "bonus.default_code_word must be alphabetic, at least 3 characters".to_string(),
        ));
    }
    if settings.bonus.sweep_time_utc().is_none() {
        return Err(BonusClubError::Config("bonus.sweep_time must be HH:MM (UTC)".to_string()));
    }
    if settings.logging.level.is_empty() {
        return Err(BonusClubError::Config("logging.level must be set".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "123456:TEST".to_string();
        settings.bot.admin_id = 42;
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut settings = valid_settings();
        settings.bot.token.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_bad_sweep_time_rejected() {
        let mut settings = valid_settings();
        settings.bonus.sweep_time = "25:00".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_nonpositive_bonus_rejected() {
        let mut settings = valid_settings();
        settings.bonus.referral_bonus = 0;
        assert!(validate_settings(&settings).is_err());
    }
}
