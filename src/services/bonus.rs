//! Bonus rules engine
//!
//! Business rules on top of the ledger: registration validation and the
//! referral credit, redemption checks with the codeword receipt, the
//! once-per-year birthday bonus, and admin balance adjustments. Every
//! balance change funnels through the ledger's transactional
//! `post_transaction` path, so admin adjustments leave the same audit
//! trail as user-initiated redemptions.

use chrono::{Datelike, NaiveDate};
use teloxide::types::ChatId;
use tracing::{info, warn};

use crate::config::BonusConfig;
use crate::database::LedgerService;
use crate::database::repositories::{CreateUserOutcome, PostTransactionOutcome};
use crate::models::user::User;
use crate::models::transaction::Operation;
use crate::services::notification::NotificationService;
use crate::utils::errors::Result;
use crate::utils::logging::{log_admin_action, log_ledger_posting};
use crate::utils::validation;

/// Outcome of a registration attempt, after validation
#[derive(Debug)]
pub enum RegistrationOutcome {
    Registered { user: User, referral_credited: bool },
    AlreadyRegistered,
    InvalidFullName,
    InvalidBirthDate,
}

/// Outcome of a redemption attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionOutcome {
    Redeemed { amount: i64, new_balance: i64, code_word: String },
    InsufficientBalance { balance: i64 },
    UnknownUser,
}

/// Outcome of an admin balance adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentOutcome {
    Adjusted { new_balance: i64 },
    UnknownUser,
}

/// A user credited by the birthday sweep, pending notification
#[derive(Debug, Clone)]
pub struct BirthdayCredit {
    pub user_id: i64,
    pub first_name: String,
}

/// Tally of a completed sweep run
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepReport {
    pub credited: u32,
    pub notified: u32,
    pub failed_notifications: u32,
}

#[derive(Debug, Clone)]
pub struct BonusService {
    ledger: LedgerService,
    config: BonusConfig,
}

impl BonusService {
    pub fn new(ledger: LedgerService, config: BonusConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }

    pub fn config(&self) -> &BonusConfig {
        &self.config
    }

    /// Parse a referral start-parameter of the form `ref_<id>`. A referrer
    /// equal to the user themselves is ignored, not an error.
    pub fn parse_referrer(start_arg: &str, user_id: i64) -> Option<i64> {
        let referrer: i64 = start_arg.strip_prefix("ref_")?.trim().parse().ok()?;
        if referrer == user_id {
            return None;
        }
        Some(referrer)
    }

    /// Validate registration input and create the user. The registration
    /// bonus and any referral bonus post atomically with the user insert.
    pub async fn register(
        &self,
        user_id: i64,
        full_name_raw: &str,
        birth_date_raw: &str,
        invited_by: Option<i64>,
    ) -> Result<RegistrationOutcome> {
        let Some(full_name) = validation::parse_full_name(full_name_raw) else {
            return Ok(RegistrationOutcome::InvalidFullName);
        };
        let Some((_, birth_date)) = validation::parse_birth_date(birth_date_raw) else {
            return Ok(RegistrationOutcome::InvalidBirthDate);
        };

        // Self-referral is silently dropped
        let invited_by = invited_by.filter(|&inviter| inviter != user_id);

        let outcome = self
            .ledger
            .users
            .create(
                crate::models::user::CreateUserRequest {
                    user_id,
                    full_name,
                    birth_date,
                    invited_by,
                },
                self.config.registration_bonus,
                self.config.referral_bonus,
            )
            .await?;

        match outcome {
            CreateUserOutcome::Created { user, referral_credited } => {
                info!(user_id = user_id, referral_credited = referral_credited, "User registered");
                Ok(RegistrationOutcome::Registered { user, referral_credited })
            }
            CreateUserOutcome::AlreadyExists => Ok(RegistrationOutcome::AlreadyRegistered),
        }
    }

    /// Redeem `amount` points. Rejects amounts above the current balance;
    /// on success reveals a randomly chosen active codeword as the receipt.
    pub async fn redeem(&self, user_id: i64, amount: i64) -> Result<RedemptionOutcome> {
        let Some(user) = self.ledger.users.find_by_user_id(user_id).await? else {
            return Ok(RedemptionOutcome::UnknownUser);
        };

        if amount <= 0 || amount > user.bonus_balance {
            return Ok(RedemptionOutcome::InsufficientBalance { balance: user.bonus_balance });
        }

        let posted = self
            .ledger
            .users
            .post_transaction(user_id, amount, Operation::Subtract, "Bonus redemption")
            .await?;

        match posted {
            PostTransactionOutcome::Posted { new_balance } => {
                log_ledger_posting(user_id, amount, "subtract", "Bonus redemption");
                let code_word = self
                    .ledger
                    .random_active_word(&self.config.default_code_word)
                    .await?;
                Ok(RedemptionOutcome::Redeemed { amount, new_balance, code_word })
            }
            PostTransactionOutcome::UserNotFound => Ok(RedemptionOutcome::UnknownUser),
        }
    }

    /// Admin-initiated balance adjustment, through the same transactional
    /// primitive as every other mutation.
    pub async fn adjust(
        &self,
        admin_id: i64,
        user_id: i64,
        amount: i64,
        operation: Operation,
    ) -> Result<AdjustmentOutcome> {
        let description = match operation {
            Operation::Add => "Credited by administrator",
            Operation::Subtract => "Debited by administrator",
        };

        let posted = self
            .ledger
            .users
            .post_transaction(user_id, amount, operation, description)
            .await?;

        match posted {
            PostTransactionOutcome::Posted { new_balance } => {
                log_admin_action(admin_id, operation.as_str(), Some(user_id));
                Ok(AdjustmentOutcome::Adjusted { new_balance })
            }
            PostTransactionOutcome::UserNotFound => Ok(AdjustmentOutcome::UnknownUser),
        }
    }

    /// Ledger half of the birthday sweep: credit every user whose birthday
    /// is `today` and who has not received this year's bonus. Each user is
    /// its own short transaction; the returned list is what still needs
    /// notifying.
    pub async fn sweep_ledger(&self, today: NaiveDate) -> Result<Vec<BirthdayCredit>> {
        let day_month = format!("{:02}.{:02}", today.day(), today.month());
        let candidates = self.ledger.users.find_birthday_users(&day_month).await?;

        let mut credited = Vec::new();
        for user in candidates {
            let claimed = self
                .ledger
                .users
                .claim_birthday_bonus(user.user_id, today.year(), self.config.birthday_bonus)
                .await?;
            if claimed {
                log_ledger_posting(user.user_id, self.config.birthday_bonus, "add", "Birthday bonus");
                credited.push(BirthdayCredit {
                    user_id: user.user_id,
                    first_name: validation::first_name(&user.full_name).to_string(),
                });
            }
        }

        Ok(credited)
    }

    /// Full daily sweep: credit, then notify. Notification failures are
    /// logged and counted; the bonus stays posted regardless.
    pub async fn run_birthday_sweep(
        &self,
        today: NaiveDate,
        notifier: &NotificationService,
    ) -> Result<SweepReport> {
        let credited = self.sweep_ledger(today).await?;
        let mut report = SweepReport {
            credited: credited.len() as u32,
            ..SweepReport::default()
        };

        for credit in &credited {
            let text = self.birthday_greeting(&credit.first_name);
            if notifier.send_text(ChatId(credit.user_id), &text).await {
                report.notified += 1;
            } else {
                report.failed_notifications += 1;
            }
        }

        if report.credited > 0 {
            info!(
                credited = report.credited,
                notified = report.notified,
                failed = report.failed_notifications,
                "Birthday sweep completed"
            );
        }
        Ok(report)
    }

    /// Opportunistic single-user birthday check, run on /start so a user
    /// whose birthday falls today is credited even before the daily sweep.
    pub async fn check_user_birthday(
        &self,
        user: &User,
        today: NaiveDate,
        notifier: &NotificationService,
    ) -> Result<()> {
        let Some((day, month)) = user.birth_day_month() else {
            warn!(user_id = user.user_id, birth_date = %user.birth_date, "Unparseable stored birth date");
            return Ok(());
        };
        if (day, month) != (today.day(), today.month()) {
            return Ok(());
        }

        let claimed = self
            .ledger
            .users
            .claim_birthday_bonus(user.user_id, today.year(), self.config.birthday_bonus)
            .await?;
        if claimed {
            log_ledger_posting(user.user_id, self.config.birthday_bonus, "add", "Birthday bonus");
            let text = self.birthday_greeting(validation::first_name(&user.full_name));
            notifier.send_text(ChatId(user.user_id), &text).await;
        }
        Ok(())
    }

    fn birthday_greeting(&self, first_name: &str) -> String {
        format!(
            "🎂 Happy birthday, {}!\nWe have added {} bonus points to your balance as a gift.",
            first_name, self.config.birthday_bonus
        )
    }
}
