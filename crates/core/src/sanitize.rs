//! Free-text sanitization and contact-field validation.
//!
//! Anything typed into a public form (booking notes, lead messages, chat
//! turns, listing copy) passes through [`sanitize_text`] before it is stored
//! or forwarded to the text-generation provider.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// `<script>` / `<style>` elements together with their bodies.
static EMBEDDED_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>").expect("valid regex")
});

/// Any remaining opening, closing, comment or doctype tag.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</?[a-zA-Z!][^>]*>").expect("valid regex"));

static JS_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("valid regex"));

/// Inline event handler attributes such as `onclick=`.
static EVENT_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bon[a-z]+\s*=").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid regex")
});

/// Minimum and maximum digit count accepted for phone numbers (E.164 tops out at 15).
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

/// One removal pass over every pattern.
fn strip_once(input: &str) -> String {
    let without_code = EMBEDDED_CODE_RE.replace_all(input, "");
    let without_tags = TAG_RE.replace_all(&without_code, "");
    let without_scheme = JS_SCHEME_RE.replace_all(&without_tags, "");
    EVENT_HANDLER_RE
        .replace_all(&without_scheme, "")
        .into_owned()
}

/// Strip markup and script vectors from user-provided text.
///
/// `"<script>alert(1)</script>hello"` becomes `"hello"`. Passes repeat until
/// nothing changes, so markup split around an inner tag
/// (`<<b>script>`) cannot reassemble. Every pass only deletes, so the loop
/// ends.
pub fn sanitize_text(input: &str) -> String {
    let mut current = strip_once(input);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current.trim().to_string();
        }
        current = next;
    }
}

/// Sanitize an optional field, mapping blank results to `None`.
pub fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input.map(sanitize_text).filter(|s| !s.is_empty())
}

/// Sanitize a required field and reject it when nothing survives.
pub fn sanitize_required(field: &str, input: &str, max_len: usize) -> Result<String, CoreError> {
    let clean = sanitize_text(input);
    if clean.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if clean.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max_len} characters"
        )));
    }
    Ok(clean)
}

// ---------------------------------------------------------------------------
// Contact fields
// ---------------------------------------------------------------------------

/// Normalize a phone number to `+` followed by digits only.
///
/// Spaces, dashes, dots and parentheses are dropped. Returns a validation
/// error if the digit count is out of range or other characters appear.
pub fn normalize_phone(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => {
                return Err(CoreError::Validation(format!(
                    "Invalid character '{c}' in phone number"
                )))
            }
        }
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(CoreError::Validation(format!(
            "Phone number must contain between {MIN_PHONE_DIGITS} and {MAX_PHONE_DIGITS} digits"
        )));
    }

    Ok(format!("{plus}{digits}"))
}

/// Validate an email address shape and return it lowercased.
pub fn normalize_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(CoreError::Validation(format!(
            "Invalid email address '{email}'"
        )));
    }
    Ok(email)
}
