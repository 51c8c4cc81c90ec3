//! Input validation for the ingestion wizard
//!
//! Validators return the cleaned value or a [`ValidationError`] whose
//! display text is the re-prompt message; the wizard never advances on a
//! validation failure.

use lazy_regex::regex_is_match;
use thiserror::Error;

/// Maximum stored length for a chapter display name
pub const MAX_CHAPTER_NAME_LEN: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Chapter name cannot be empty. Please enter a valid name.")]
    EmptyChapterName,

    #[error("Chapter name is too long (max {MAX_CHAPTER_NAME_LEN} characters). Please enter a shorter name.")]
    ChapterNameTooLong,

    #[error("Chapter name must contain at least one letter or digit.")]
    ChapterNameNotAddressable,

    #[error("'{0}' is not a valid lecture number. Use digits with an optional decimal part and an optional trailing letter, e.g. 3, 2.1 or 4A.")]
    BadLectureNumber(String),
}

/// Validates and trims a free-text chapter name.
///
/// The at-least-one-alphanumeric rule guarantees the name has a non-empty
/// slug, so it stays addressable through the lossy token arm.
pub fn validate_chapter_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyChapterName);
    }
    if name.chars().count() > MAX_CHAPTER_NAME_LEN {
        return Err(ValidationError::ChapterNameTooLong);
    }
    if !name.chars().any(|c| c.is_alphanumeric()) {
        return Err(ValidationError::ChapterNameNotAddressable);
    }
    Ok(name.to_string())
}

/// Validates and trims a lecture number.
///
/// Grammar: one or more digits, optional `.` + digits, optional single
/// trailing ASCII letter. Examples: `3`, `2.1`, `4A`, `10.2b`.
pub fn validate_lecture_number(input: &str) -> Result<String, ValidationError> {
    let no = input.trim();
    if regex_is_match!(r"^[0-9]+(\.[0-9]+)?[A-Za-z]?$", no) {
        Ok(no.to_string())
    } else {
        Err(ValidationError::BadLectureNumber(no.to_string()))
    }
}

/// Suggests the next lecture number: one past the highest integer prefix
/// among existing numbers, `1` for an empty chapter.
pub fn suggest_next_lecture_number(existing: &[String]) -> String {
    let max = existing
        .iter()
        .filter_map(|no| {
            let digits: String = no.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}
