//! Ledger store integration tests
//!
//! Each test runs against a fresh in-memory SQLite database with the
//! real migrations applied, exercising the repositories directly.

#![allow(non_snake_case)]

use assert_matches::assert_matches;
use sqlx::sqlite::SqlitePoolOptions;

use BonusClub::database::connection::DatabasePool;
use BonusClub::database::repositories::{
    CreateUserOutcome, CreateWordOutcome, DeleteOutcome, PostTransactionOutcome,
    UpdateWordOutcome,
};
use BonusClub::database::LedgerService;
use BonusClub::models::promotion::CreatePromotionRequest;
use BonusClub::models::transaction::Operation;
use BonusClub::models::user::CreateUserRequest;

async fn test_pool() -> DatabasePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

fn request(user_id: i64) -> CreateUserRequest {
    CreateUserRequest {
        user_id,
        full_name: "Ivan Petrov".to_string(),
        birth_date: "15.05.1990".to_string(),
        invited_by: None,
    }
}

async fn register(ledger: &LedgerService, user_id: i64) {
    let outcome = ledger
        .users
        .create(request(user_id), 100, 100)
        .await
        .unwrap();
    assert_matches!(outcome, CreateUserOutcome::Created { .. });
}

#[tokio::test]
async fn balance_equals_signed_sum_of_transactions() {
    let ledger = LedgerService::new(test_pool().await);
    register(&ledger, 1).await;

    ledger.users.post_transaction(1, 250, Operation::Add, "promo").await.unwrap();
    ledger.users.post_transaction(1, 70, Operation::Subtract, "redeem").await.unwrap();
    ledger.users.post_transaction(1, 30, Operation::Add, "promo").await.unwrap();

    let user = ledger.users.find_by_user_id(1).await.unwrap().unwrap();
    let transactions = ledger.users.transactions(1).await.unwrap();

    let signed_sum: i64 = transactions.iter().map(|t| t.signed_amount()).sum();
    assert_eq!(user.bonus_balance, signed_sum);
    assert_eq!(user.bonus_balance, 100 + 250 - 70 + 30);
}

#[tokio::test]
async fn registration_posts_welcome_bonus_exactly_once() {
    let ledger = LedgerService::new(test_pool().await);
    register(&ledger, 1).await;

    let transactions = ledger.users.transactions(1).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, 100);
    assert_eq!(transactions[0].operation, Operation::Add);
    assert_eq!(transactions[0].description, "Registration bonus");
}

#[tokio::test]
async fn duplicate_registration_is_rejected_without_side_effects() {
    let ledger = LedgerService::new(test_pool().await);
    register(&ledger, 1).await;

    let second = ledger.users.create(request(1), 100, 100).await.unwrap();
    assert_matches!(second, CreateUserOutcome::AlreadyExists);

    let user = ledger.users.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 100);
    assert_eq!(ledger.users.transactions(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn referral_bonus_goes_to_the_inviter() {
    let ledger = LedgerService::new(test_pool().await);
    register(&ledger, 1).await;

    let mut invited = request(2);
    invited.invited_by = Some(1);
    let outcome = ledger.users.create(invited, 100, 100).await.unwrap();
    assert_matches!(outcome, CreateUserOutcome::Created { referral_credited: true, .. });

    let inviter = ledger.users.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(inviter.bonus_balance, 200);

    let log = ledger.users.transactions(1).await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].description, "Referral bonus for inviting 2");
}

#[tokio::test]
async fn dangling_inviter_skips_the_referral_bonus() {
    let ledger = LedgerService::new(test_pool().await);

    let mut invited = request(2);
    invited.invited_by = Some(999);
    let outcome = ledger.users.create(invited, 100, 100).await.unwrap();
    assert_matches!(outcome, CreateUserOutcome::Created { referral_credited: false, .. });

    let user = ledger.users.find_by_user_id(2).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 100);
}

#[tokio::test]
async fn posting_to_a_missing_user_reports_not_found() {
    let ledger = LedgerService::new(test_pool().await);

    let outcome = ledger
        .users
        .post_transaction(42, 10, Operation::Add, "promo")
        .await
        .unwrap();
    assert_eq!(outcome, PostTransactionOutcome::UserNotFound);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let ledger = LedgerService::new(test_pool().await);
    register(&ledger, 1).await;

    assert!(ledger.users.post_transaction(1, 0, Operation::Add, "x").await.is_err());
    assert!(ledger.users.post_transaction(1, -5, Operation::Add, "x").await.is_err());

    let user = ledger.users.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 100);
}

#[tokio::test]
async fn birthday_bonus_claims_at_most_once_per_year() {
    let ledger = LedgerService::new(test_pool().await);
    register(&ledger, 1).await;

    assert!(ledger.users.claim_birthday_bonus(1, 2024, 300).await.unwrap());
    assert!(!ledger.users.claim_birthday_bonus(1, 2024, 300).await.unwrap());

    let user = ledger.users.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 400);
    assert_eq!(user.last_birthday_bonus_year, Some(2024));

    // A new year claims again
    assert!(ledger.users.claim_birthday_bonus(1, 2025, 300).await.unwrap());
    let user = ledger.users.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 700);
}

#[tokio::test]
async fn birthday_lookup_matches_on_day_and_month() {
    let ledger = LedgerService::new(test_pool().await);
    register(&ledger, 1).await; // 15.05.1990

    let mut other = request(2);
    other.birth_date = "16.05.1985".to_string();
    ledger.users.create(other, 100, 100).await.unwrap();

    let found = ledger.users.find_birthday_users("15.05").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].user_id, 1);

    assert!(ledger.users.find_birthday_users("01.01").await.unwrap().is_empty());
}

#[tokio::test]
async fn promotion_crud_roundtrip() {
    let ledger = LedgerService::new(test_pool().await);

    let promotion = ledger
        .promotions
        .create(CreatePromotionRequest {
            title: "Double points weekend".to_string(),
            description: "Earn twice the points on every purchase.".to_string(),
        })
        .await
        .unwrap();
    assert!(promotion.is_active);

    let active = ledger.promotions.active().await.unwrap();
    assert_eq!(active.len(), 1);

    assert_eq!(
        ledger.promotions.delete(promotion.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        ledger.promotions.delete(promotion.id).await.unwrap(),
        DeleteOutcome::NotFound
    );
    assert!(ledger.promotions.active().await.unwrap().is_empty());
}

#[tokio::test]
async fn codeword_uniqueness_surfaces_as_outcomes() {
    let ledger = LedgerService::new(test_pool().await);

    let created = ledger.bonus_words.create("SPARKLE").await.unwrap();
    let word_id = assert_matches!(created, CreateWordOutcome::Created(w) => w.id);

    assert_matches!(
        ledger.bonus_words.create("SPARKLE").await.unwrap(),
        CreateWordOutcome::AlreadyExists
    );

    // "VIP" is seeded by the migrations
    assert_eq!(
        ledger.bonus_words.update(word_id, "VIP").await.unwrap(),
        UpdateWordOutcome::DuplicateWord
    );
    assert_eq!(
        ledger.bonus_words.update(word_id, "TWINKLE").await.unwrap(),
        UpdateWordOutcome::Updated
    );
    assert_eq!(
        ledger.bonus_words.update(99999, "NOPE").await.unwrap(),
        UpdateWordOutcome::NotFound
    );

    assert_eq!(
        ledger.bonus_words.delete(word_id).await.unwrap(),
        DeleteOutcome::Deleted
    );
}

#[tokio::test]
async fn codewords_are_stored_uppercase_regardless_of_caller_input() {
    let ledger = LedgerService::new(test_pool().await);

    let created = ledger.bonus_words.create("sparkle").await.unwrap();
    let word = assert_matches!(created, CreateWordOutcome::Created(w) => w);
    assert_eq!(word.word, "SPARKLE");

    // A differently-cased duplicate still collides
    assert_matches!(
        ledger.bonus_words.create("Sparkle").await.unwrap(),
        CreateWordOutcome::AlreadyExists
    );

    assert_eq!(
        ledger.bonus_words.update(word.id, "twinkle").await.unwrap(),
        UpdateWordOutcome::Updated
    );
    let all = ledger.bonus_words.all().await.unwrap();
    assert!(all.iter().any(|w| w.word == "TWINKLE"));
    assert!(!all.iter().any(|w| w.word == "twinkle"));
}

#[tokio::test]
async fn random_word_falls_back_to_the_default_when_none_active() {
    let pool = test_pool().await;
    sqlx::query("DELETE FROM bonus_words")
        .execute(&pool)
        .await
        .unwrap();

    let ledger = LedgerService::new(pool);
    let word = ledger.random_active_word("BONUS").await.unwrap();
    assert_eq!(word, "BONUS");
}
