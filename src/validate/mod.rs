// SPDX-License-Identifier: MIT
//! Input sanitization and validation.
//!
//! Every externally-supplied field goes through the same two-step contract:
//! *sanitize* (total — always returns a value, never errors) then *validate*
//! (a predicate on the sanitized value). [`Sanitized`] bundles both so a
//! caller can echo the sanitized value back to the user even when it failed
//! validation, without re-deriving it.
//!
//! All functions here are pure and perform no I/O — they are safe to call on
//! every keystroke for live previews. Failure is only ever communicated
//! through the `is_valid` flag.

use once_cell::sync::Lazy;
use regex::Regex;

pub const TOKEN_MIN_LEN: usize = 6;
pub const TOKEN_MAX_LEN: usize = 50;
pub const PLATE_MIN_LEN: usize = 2;
pub const PLATE_MAX_LEN: usize = 15;
pub const RAGE_MAX: u32 = 10;
pub const ETA_MAX_MINUTES: u32 = 1440;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{6,50}$").expect("regex: token"));
static UUID_V4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("regex: uuid v4")
});
// Malaysian numbering after the +60 country code: mobile 1XXXXXXXX(X),
// landline area codes 3-9 with 7-8 subscriber digits.
static MY_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+60(1\d{8,9}|[3-9]\d{7,8})$").expect("regex: my phone"));

// ─── Results ─────────────────────────────────────────────────────────────────

/// A sanitized value plus the verdict of its validation predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized<T> {
    pub value: T,
    pub is_valid: bool,
}

impl<T> Sanitized<T> {
    fn new(value: T, is_valid: bool) -> Self {
        Self { value, is_valid }
    }
}

/// A Malaysian phone number in canonical `+60…` form together with the
/// digits-only id the messaging service addresses it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    pub canonical: String,
    pub wa_id: String,
}

// ─── Token ───────────────────────────────────────────────────────────────────

/// Strip everything outside `[a-zA-Z0-9]`.
pub fn sanitize_token(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// A sanitized token is valid iff it is 6-50 alphanumeric characters.
pub fn validate_token(token: &str) -> bool {
    TOKEN_RE.is_match(token)
}

pub fn check_token(raw: &str) -> Sanitized<String> {
    let value = sanitize_token(raw);
    let is_valid = validate_token(&value);
    Sanitized::new(value, is_valid)
}

// ─── License plate ───────────────────────────────────────────────────────────

/// Trim, uppercase, and strip characters outside `[A-Z0-9\s-]`.
pub fn sanitize_plate(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect()
}

/// A sanitized plate is valid iff its trimmed length is 2-15.
pub fn validate_plate(plate: &str) -> bool {
    let len = plate.trim().chars().count();
    (PLATE_MIN_LEN..=PLATE_MAX_LEN).contains(&len)
}

pub fn check_plate(raw: &str) -> Sanitized<String> {
    let value = sanitize_plate(raw);
    let is_valid = validate_plate(&value);
    Sanitized::new(value, is_valid)
}

// ─── Numbers (rage level, ETA minutes) ───────────────────────────────────────

/// Coerce free-text input to a non-negative integer: floor, clamp at zero,
/// and map anything non-numeric to `0`.
///
/// `"abc"` and `"-5"` both coerce to `0` — a *valid* rage level. The range
/// predicates below deliberately judge only the coerced value, matching the
/// upstream contract (see DESIGN.md).
pub fn sanitize_number(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(n) => coerce_f64(n),
        Err(_) => 0,
    }
}

fn coerce_f64(n: f64) -> u32 {
    if !n.is_finite() || n <= 0.0 {
        0
    } else {
        n.floor() as u32
    }
}

/// JSON-value flavor of [`sanitize_number`] for HTTP bodies, where the field
/// may arrive as a number, a numeric string, or garbage.
pub fn sanitize_number_value(v: &serde_json::Value) -> u32 {
    match v {
        serde_json::Value::Number(n) => n.as_f64().map(coerce_f64).unwrap_or(0),
        serde_json::Value::String(s) => sanitize_number(s),
        _ => 0,
    }
}

pub fn validate_rage(level: u32) -> bool {
    level <= RAGE_MAX
}

pub fn validate_eta(minutes: u32) -> bool {
    minutes <= ETA_MAX_MINUTES
}

pub fn check_rage(raw: &str) -> Sanitized<u32> {
    let value = sanitize_number(raw);
    Sanitized::new(value, validate_rage(value))
}

pub fn check_eta(raw: &str) -> Sanitized<u32> {
    let value = sanitize_number(raw);
    Sanitized::new(value, validate_eta(value))
}

// ─── Incident id ─────────────────────────────────────────────────────────────

/// Pass-through check against the canonical UUID v4 lexical grammar.
/// No sanitization — incident ids are machine-issued, not user-typed.
pub fn validate_incident_id(id: &str) -> bool {
    UUID_V4_RE.is_match(id)
}

// ─── Malaysian phone ─────────────────────────────────────────────────────────

/// Normalize a phone number toward canonical `+60…` form.
///
/// Recognized prefixes: leading `0` (local form), bare `60`, and `+60`.
/// Anything else keeps its digits behind a `+` and will fail validation.
/// The derived `wa_id` is the canonical number with every non-digit removed.
pub fn sanitize_phone(raw: &str) -> PhoneNumber {
    let trimmed = raw.trim();
    let had_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    let canonical = if digits.starts_with("60") {
        format!("+{digits}")
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+60{rest}")
    } else if had_plus {
        format!("+{digits}")
    } else {
        format!("+{digits}")
    };
    let wa_id: String = canonical.chars().filter(|c| c.is_ascii_digit()).collect();

    PhoneNumber { canonical, wa_id }
}

/// Valid iff the canonical form matches the Malaysian mobile/landline grammar.
pub fn validate_phone(phone: &PhoneNumber) -> bool {
    MY_PHONE_RE.is_match(&phone.canonical)
}

pub fn check_phone(raw: &str) -> Sanitized<PhoneNumber> {
    let value = sanitize_phone(raw);
    let is_valid = validate_phone(&value);
    Sanitized::new(value, is_valid)
}
