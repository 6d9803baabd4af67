// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Phone number normalization for mobile-money subscribers.
//!
//! The gateway expects subscriber numbers as bare digits prefixed with the
//! country code (`237690123456`). Donors type numbers in every shape
//! imaginable (`+237 690 12 34 56`, `0690123456`, `690-123-456`), so the
//! normalizer is total: it never fails, and callers check [`is_valid`]
//! before handing the number to the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default country calling code (Cameroon).
pub const DEFAULT_COUNTRY_CODE: &str = "237";

/// Minimum number of digits in a valid normalized number.
const MIN_DIGITS: usize = 10;

/// A phone number in the gateway's canonical subscriber format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// All digits and at least ten of them.
    pub fn is_valid(&self) -> bool {
        self.0.len() >= MIN_DIGITS && self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NormalizedPhone> for String {
    fn from(value: NormalizedPhone) -> Self {
        value.0
    }
}

/// Normalize loosely formatted input into `<country code><subscriber>`.
pub fn normalize(raw: &str) -> NormalizedPhone {
    // Dropping everything but digits also drops a leading '+'.
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if !digits.starts_with(DEFAULT_COUNTRY_CODE) {
        if let Some(rest) = digits.strip_prefix('0') {
            digits = rest.to_string();
        }
        digits.insert_str(0, DEFAULT_COUNTRY_CODE);
    }

    NormalizedPhone(digits)
}

/// Whether `raw` normalizes to a usable subscriber number.
pub fn is_valid(raw: &str) -> bool {
    normalize(raw).is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn local_number_gets_country_code() {
        assert_eq!(normalize("690123456").as_str(), "237690123456");
    }

    #[test]
    fn leading_national_zero_is_dropped() {
        assert_eq!(normalize("0690123456").as_str(), "237690123456");
    }

    #[test]
    fn international_format_is_kept() {
        assert_eq!(normalize("+237 690 12 34 56").as_str(), "237690123456");
        assert_eq!(normalize("237690123456").as_str(), "237690123456");
    }

    #[test]
    fn separators_are_stripped() {
        assert_eq!(normalize("(690) 123-456").as_str(), "237690123456");
    }

    #[test]
    fn empty_input_is_country_code_only_and_invalid() {
        let phone = normalize("");
        assert_eq!(phone.as_str(), "237");
        assert!(!phone.is_valid());
        assert!(!is_valid("   "));
    }

    #[test]
    fn short_numbers_are_invalid() {
        assert!(!is_valid("123"));
        assert_eq!(normalize("123").as_str(), "237123");
    }

    #[test]
    fn only_one_national_zero_is_stripped() {
        assert_eq!(normalize("00690123456").as_str(), "2370690123456");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&normalize("690123456")).unwrap();
        assert_eq!(json, "\"237690123456\"");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in ".{0,24}") {
            let once = normalize(&raw);
            let twice = normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn local_subscriber_numbers_are_valid(
            subscriber in "6[0-9]{8}",
            national_zero in any::<bool>(),
        ) {
            let raw = if national_zero {
                format!("0{subscriber}")
            } else {
                subscriber.clone()
            };
            let phone = normalize(&raw);
            prop_assert!(phone.is_valid());
            prop_assert!(phone.as_str().starts_with(DEFAULT_COUNTRY_CODE));
            prop_assert_eq!(phone.as_str().len(), DEFAULT_COUNTRY_CODE.len() + 9);
            prop_assert_eq!(&phone.as_str()[DEFAULT_COUNTRY_CODE.len()..], subscriber.as_str());
        }
    }
}
