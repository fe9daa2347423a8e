//! Property tests for the sanitization/validation layer.
//!
//! The universal properties: sanitizers are total, outputs stay inside their
//! charsets, and validity is decided purely by range/length checks on the
//! sanitized value.

use bmwd::validate::{
    check_eta, check_phone, check_plate, check_rage, check_token, sanitize_number,
    sanitize_phone, sanitize_plate, sanitize_token,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn token_sanitizer_emits_only_alphanumerics(s in ".*") {
        let out = sanitize_token(&s);
        prop_assert!(out.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn token_validity_is_exactly_a_length_check(s in ".*") {
        let checked = check_token(&s);
        prop_assert_eq!(checked.is_valid, (6..=50).contains(&checked.value.len()));
    }

    #[test]
    fn token_sanitization_is_idempotent(s in ".*") {
        let once = sanitize_token(&s);
        prop_assert_eq!(sanitize_token(&once), once);
    }

    #[test]
    fn plate_sanitizer_stays_in_charset(s in ".*") {
        let out = sanitize_plate(&s);
        prop_assert!(out.chars().all(|c| {
            c.is_ascii_uppercase() || c.is_ascii_digit() || c.is_whitespace() || c == '-'
        }));
    }

    #[test]
    fn plate_validity_is_exactly_a_length_check(s in ".*") {
        let checked = check_plate(&s);
        let len = checked.value.trim().chars().count();
        prop_assert_eq!(checked.is_valid, (2..=15).contains(&len));
    }

    #[test]
    fn number_coercion_is_total_and_validity_is_range_only(s in ".*") {
        let n = sanitize_number(&s);
        prop_assert_eq!(check_rage(&s).is_valid, n <= 10);
        prop_assert_eq!(check_eta(&s).is_valid, n <= 1440);
    }

    #[test]
    fn integer_strings_survive_coercion(n in 0u32..100_000u32) {
        prop_assert_eq!(sanitize_number(&n.to_string()), n);
    }

    #[test]
    fn floats_floor_not_round(n in 0u32..1000u32, frac in 0u32..100u32) {
        let s = format!("{n}.{frac:02}");
        prop_assert_eq!(sanitize_number(&s), n);
    }

    #[test]
    fn phone_wa_id_is_always_digits(s in ".*") {
        let phone = sanitize_phone(&s);
        prop_assert!(phone.wa_id.chars().all(|c| c.is_ascii_digit()));
        prop_assert!(phone.canonical.starts_with('+'));
    }

    #[test]
    fn valid_phones_are_always_malaysian(s in ".*") {
        let checked = check_phone(&s);
        if checked.is_valid {
            prop_assert!(checked.value.canonical.starts_with("+60"));
        }
    }
}
