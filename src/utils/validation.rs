//! Input validation helpers
//!
//! Shape predicates and parsers for the free-text inputs the conversation
//! flows accept. Each returns `None` for input that should trigger a
//! re-prompt (state preserved, see the dispatcher contract).

use std::sync::OnceLock;
use chrono::NaiveDate;
use regex::Regex;

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("static regex"))
}

fn birth_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("static regex"))
}

/// Validate a full name: at least two whitespace-separated tokens.
pub fn parse_full_name(input: &str) -> Option<String> {
    let name = input.trim();
    if name.split_whitespace().count() < 2 {
        return None;
    }
    Some(name.to_string())
}

/// First token of a full name, for personalised messages.
pub fn first_name(full_name: &str) -> &str {
    full_name.split_whitespace().next().unwrap_or(full_name)
}

/// Validate a birth date in DD.MM.YYYY form as a real calendar date.
/// Returns the date together with the canonical DD.MM.YYYY text that is
/// stored on the user row.
pub fn parse_birth_date(input: &str) -> Option<(NaiveDate, String)> {
    let text = input.trim();
    if !birth_date_re().is_match(text) {
        return None;
    }
    let date = NaiveDate::parse_from_str(text, "%d.%m.%Y").ok()?;
    Some((date, text.to_string()))
}

/// Validate a positive integer bonus amount.
pub fn parse_amount(input: &str) -> Option<i64> {
    let text = input.trim();
    if !amount_re().is_match(text) {
        return None;
    }
    let amount = text.parse::<i64>().ok()?;
    if amount <= 0 {
        return None;
    }
    Some(amount)
}

/// Validate a promotion title: at least 5 characters after trimming.
pub fn parse_promotion_title(input: &str) -> Option<String> {
    let title = input.trim();
    if title.chars().count() < 5 {
        return None;
    }
    Some(title.to_string())
}

/// Validate a redemption codeword: alphabetic, at least 3 characters.
/// Words are case-normalized to uppercase.
pub fn normalize_bonus_word(input: &str) -> Option<String> {
    let word = input.trim();
    if word.chars().count() < 3 || !word.chars().all(|c| c.is_alphabetic()) {
        return None;
    }
    Some(word.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_requires_two_tokens() {
        assert_eq!(parse_full_name("  Ivan  Petrov "), Some("Ivan  Petrov".to_string()));
        assert!(parse_full_name("Ivan Petrovich Sidorov").is_some());
        assert!(parse_full_name("Ivan").is_none());
        assert!(parse_full_name("   ").is_none());
    }

    #[test]
    fn test_first_name() {
        assert_eq!(first_name("Ivan Petrov"), "Ivan");
    }

    #[test]
    fn test_birth_date_shape_and_calendar() {
        let (date, text) = parse_birth_date("15.05.1990").unwrap();
        assert_eq!(text, "15.05.1990");
        assert_eq!(date, NaiveDate::from_ymd_opt(1990, 5, 15).unwrap());

        // shape mismatches
        assert!(parse_birth_date("1990-05-15").is_none());
        assert!(parse_birth_date("5.5.1990").is_none());
        assert!(parse_birth_date("not-a-date").is_none());
        // well-shaped but not a real date
        assert!(parse_birth_date("31.02.1990").is_none());
        assert!(parse_birth_date("00.01.1990").is_none());
    }

    #[test]
    fn test_amount() {
        assert_eq!(parse_amount("150"), Some(150));
        assert_eq!(parse_amount(" 42 "), Some(42));
        assert!(parse_amount("0").is_none());
        assert!(parse_amount("-5").is_none());
        assert!(parse_amount("12.5").is_none());
        assert!(parse_amount("abc").is_none());
    }

    #[test]
    fn test_promotion_title_length() {
        assert_eq!(parse_promotion_title("  Double points  "), Some("Double points".to_string()));
        assert!(parse_promotion_title("Sale").is_none());
        assert!(parse_promotion_title("    ").is_none());
    }

    #[test]
    fn test_bonus_word_normalization() {
        assert_eq!(normalize_bonus_word("gold"), Some("GOLD".to_string()));
        assert_eq!(normalize_bonus_word(" vip "), Some("VIP".to_string()));
        assert!(normalize_bonus_word("ab").is_none());
        assert!(normalize_bonus_word("b0nus").is_none());
    }
}
