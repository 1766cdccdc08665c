//! Bonus rules engine integration tests
//!
//! Drives the rules layer end to end against an in-memory database:
//! registration validation, referral credits, redemption limits, admin
//! adjustments and the idempotent birthday sweep.

#![allow(non_snake_case)]

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePoolOptions;

use BonusClub::config::BonusConfig;
use BonusClub::database::LedgerService;
use BonusClub::models::transaction::Operation;
use BonusClub::services::bonus::{
    AdjustmentOutcome, BonusService, RedemptionOutcome, RegistrationOutcome,
};

const SEEDED_WORDS: &[&str] = &["GOLD CLIENT", "PREMIUM", "BONUS", "VIP"];

fn config() -> BonusConfig {
    BonusConfig {
        registration_bonus: 100,
        referral_bonus: 100,
        birthday_bonus: 300,
        default_code_word: "BONUS".to_string(),
        sweep_time: "10:00".to_string(),
    }
}

async fn service() -> BonusService {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    BonusService::new(LedgerService::new(pool), config())
}

async fn register(service: &BonusService, user_id: i64, birth_date: &str) {
    let outcome = service
        .register(user_id, "Ivan Petrov", birth_date, None)
        .await
        .unwrap();
    assert_matches!(outcome, RegistrationOutcome::Registered { .. });
}

#[tokio::test]
async fn registration_credits_the_welcome_bonus() {
    let service = service().await;

    let outcome = service
        .register(1, "Ivan Petrov", "15.05.1990", None)
        .await
        .unwrap();
    let user = assert_matches!(outcome, RegistrationOutcome::Registered { user, .. } => user);

    assert_eq!(user.bonus_balance, 100);
    assert_eq!(user.birth_date, "15.05.1990");
}

#[tokio::test]
async fn registration_rejects_bad_input_before_touching_the_ledger() {
    let service = service().await;

    assert_matches!(
        service.register(1, "Ivan", "15.05.1990", None).await.unwrap(),
        RegistrationOutcome::InvalidFullName
    );
    assert_matches!(
        service.register(1, "Ivan Petrov", "1990-05-15", None).await.unwrap(),
        RegistrationOutcome::InvalidBirthDate
    );
    assert_matches!(
        service.register(1, "Ivan Petrov", "31.02.1990", None).await.unwrap(),
        RegistrationOutcome::InvalidBirthDate
    );

    assert!(service.ledger().users.find_by_user_id(1).await.unwrap().is_none());
}

#[tokio::test]
async fn second_registration_is_already_registered() {
    let service = service().await;
    register(&service, 1, "15.05.1990").await;

    assert_matches!(
        service.register(1, "Ivan Petrov", "15.05.1990", None).await.unwrap(),
        RegistrationOutcome::AlreadyRegistered
    );
}

#[tokio::test]
async fn referral_credits_the_inviter_exactly_once() {
    let service = service().await;
    register(&service, 1, "15.05.1990").await;

    let outcome = service
        .register(2, "Pyotr Ivanov", "01.02.1991", Some(1))
        .await
        .unwrap();
    assert_matches!(outcome, RegistrationOutcome::Registered { referral_credited: true, .. });

    let inviter = service.ledger().users.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(inviter.bonus_balance, 200);

    // The invited user cannot be credited twice via a re-registration
    assert_matches!(
        service.register(2, "Pyotr Ivanov", "01.02.1991", Some(1)).await.unwrap(),
        RegistrationOutcome::AlreadyRegistered
    );
    let inviter = service.ledger().users.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(inviter.bonus_balance, 200);
}

#[tokio::test]
async fn self_referral_is_silently_dropped() {
    let service = service().await;

    let outcome = service
        .register(1, "Ivan Petrov", "15.05.1990", Some(1))
        .await
        .unwrap();
    let user = assert_matches!(outcome, RegistrationOutcome::Registered { referral_credited: false, user } => user);

    assert_eq!(user.invited_by, None);
    assert_eq!(user.bonus_balance, 100);
}

#[tokio::test]
async fn redemption_subtracts_and_reveals_a_codeword() {
    let service = service().await;
    register(&service, 1, "15.05.1990").await;
    service
        .ledger()
        .users
        .post_transaction(1, 200, Operation::Add, "promo")
        .await
        .unwrap();

    let outcome = service.redeem(1, 150).await.unwrap();
    let (new_balance, code_word) = assert_matches!(
        outcome,
        RedemptionOutcome::Redeemed { amount: 150, new_balance, code_word } => (new_balance, code_word)
    );

    assert_eq!(new_balance, 150);
    assert!(SEEDED_WORDS.contains(&code_word.as_str()), "unexpected codeword {code_word}");

    let log = service.ledger().users.transactions(1).await.unwrap();
    let redemptions: Vec<_> = log
        .iter()
        .filter(|t| t.operation == Operation::Subtract)
        .collect();
    assert_eq!(redemptions.len(), 1);
    assert_eq!(redemptions[0].amount, 150);
    assert_eq!(redemptions[0].description, "Bonus redemption");
}

#[tokio::test]
async fn redemption_above_the_balance_is_rejected() {
    let service = service().await;
    register(&service, 1, "15.05.1990").await;

    let outcome = service.redeem(1, 500).await.unwrap();
    assert_eq!(outcome, RedemptionOutcome::InsufficientBalance { balance: 100 });

    // Nothing was written
    let user = service.ledger().users.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 100);
    assert_eq!(service.ledger().users.transactions(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn redemption_by_an_unknown_user_is_reported() {
    let service = service().await;
    assert_eq!(service.redeem(404, 10).await.unwrap(), RedemptionOutcome::UnknownUser);
}

#[tokio::test]
async fn admin_adjustment_posts_an_audited_transaction() {
    let service = service().await;
    register(&service, 1, "15.05.1990").await;

    let outcome = service.adjust(777, 1, 500, Operation::Add).await.unwrap();
    assert_eq!(outcome, AdjustmentOutcome::Adjusted { new_balance: 600 });

    let log = service.ledger().users.transactions(1).await.unwrap();
    assert_eq!(log.last().unwrap().description, "Credited by administrator");

    let outcome = service.adjust(777, 1, 200, Operation::Subtract).await.unwrap();
    assert_eq!(outcome, AdjustmentOutcome::Adjusted { new_balance: 400 });
    let log = service.ledger().users.transactions(1).await.unwrap();
    assert_eq!(log.last().unwrap().description, "Debited by administrator");

    assert_eq!(
        service.adjust(777, 404, 10, Operation::Add).await.unwrap(),
        AdjustmentOutcome::UnknownUser
    );
}

#[tokio::test]
async fn birthday_sweep_credits_once_per_year() {
    let service = service().await;
    register(&service, 1, "15.05.1990").await;
    register(&service, 2, "16.05.1985").await;

    let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();

    let credited = service.sweep_ledger(today).await.unwrap();
    assert_eq!(credited.len(), 1);
    assert_eq!(credited[0].user_id, 1);
    assert_eq!(credited[0].first_name, "Ivan");

    // A rerun on the same day credits nobody
    assert!(service.sweep_ledger(today).await.unwrap().is_empty());

    let user = service.ledger().users.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 400);
    assert_eq!(user.last_birthday_bonus_year, Some(2024));

    // The untouched user keeps the welcome bonus only
    let other = service.ledger().users.find_by_user_id(2).await.unwrap().unwrap();
    assert_eq!(other.bonus_balance, 100);

    // Next year the sweep fires again
    let next_year = NaiveDate::from_ymd_opt(2025, 5, 15).unwrap();
    let credited = service.sweep_ledger(next_year).await.unwrap();
    assert_eq!(credited.len(), 1);
}

#[tokio::test]
async fn sweep_on_an_ordinary_day_credits_nobody() {
    let service = service().await;
    register(&service, 1, "15.05.1990").await;

    let today = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
    assert!(service.sweep_ledger(today).await.unwrap().is_empty());
}
