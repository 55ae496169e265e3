use crate::models::summary::SummaryLength;

pub const MAX_TEXT_CHARS: usize = 10_000;
pub const MIN_TEXT_WORDS: usize = 30;

pub const ERR_EMPTY: &str = "Text cannot be empty";
pub const ERR_TOO_LONG: &str = "Text too long (max 10,000 characters)";
pub const ERR_TOO_SHORT: &str = "Text too short (minimum 30 words)";
pub const ERR_INVALID_LENGTH: &str = "Invalid length option";

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Checks every rule and returns all violations in rule order.
pub fn validate(text: &str, length: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if text.trim().is_empty() {
        errors.push(ERR_EMPTY.to_string());
    }
    if char_count(text) > MAX_TEXT_CHARS {
        errors.push(ERR_TOO_LONG.to_string());
    }
    if word_count(text) < MIN_TEXT_WORDS {
        errors.push(ERR_TOO_SHORT.to_string());
    }
    if SummaryLength::parse(length).is_none() {
        errors.push(ERR_INVALID_LENGTH.to_string());
    }

    errors
}
