//! Registration input validation.
//!
//! All messages are German; they go straight into the error response the
//! registration form displays.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ServerError};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZäöüÄÖÜß\s\-']+$").expect("name pattern"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});

// Swiss numbers only: mobile 07x, landline 02x-05x, optional country prefix.
static PHONE_MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+41|0041)?0?7[6-9]\d{7}$").expect("mobile pattern"));
static PHONE_LANDLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+41|0041)?0?[2-5]\d{8}$").expect("landline pattern"));

/// Frequent typos of the big mail providers, caught before they bounce.
const DOMAIN_TYPOS: &[(&str, &str)] = &[
    ("gmial.com", "gmail.com"),
    ("gmal.com", "gmail.com"),
    ("gamil.com", "gmail.com"),
    ("gmai.com", "gmail.com"),
    ("hotmial.com", "hotmail.com"),
    ("hotmal.com", "hotmail.com"),
    ("outlok.com", "outlook.com"),
    ("bluewin.c", "bluewin.ch"),
    ("gmx.c", "gmx.ch"),
];

/// Validate a first or last name: 2 to 50 characters, letters (including
/// umlauts), spaces, hyphens and apostrophes.
pub fn validate_name(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < 2 || len > 50 {
        return Err(ServerError::BadRequest(format!(
            "{field} muss zwischen 2 und 50 Zeichen lang sein"
        )));
    }
    if !NAME_RE.is_match(trimmed) {
        return Err(ServerError::BadRequest(format!(
            "{field} enthält ungültige Zeichen"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate an email address, lowercased, with the domain-typo check.
pub fn validate_email(value: &str) -> Result<String> {
    let email = value.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(ServerError::BadRequest(
            "Bitte eine gültige E-Mail-Adresse angeben".to_string(),
        ));
    }

    if let Some((_, domain)) = email.rsplit_once('@')
        && let Some((_, suggestion)) = DOMAIN_TYPOS.iter().find(|(typo, _)| *typo == domain)
    {
        return Err(ServerError::BadRequest(format!(
            "E-Mail-Domain sieht falsch aus, meinten Sie {suggestion}?"
        )));
    }

    Ok(email)
}

/// Validate a Swiss phone number; separators are stripped before matching.
/// Empty input is fine, phone is optional.
pub fn validate_phone(value: &str) -> Result<Option<String>> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }

    if PHONE_MOBILE_RE.is_match(&cleaned) || PHONE_LANDLINE_RE.is_match(&cleaned) {
        Ok(Some(cleaned))
    } else {
        Err(ServerError::BadRequest(
            "Bitte eine gültige Schweizer Telefonnummer angeben".to_string(),
        ))
    }
}
