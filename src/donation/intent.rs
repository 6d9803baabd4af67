// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Donation form input and its validated counterpart.
//!
//! [`DonationForm`] is what the donor typed; [`DonationIntent`] is the only
//! shape the rest of the flow accepts, and [`DonationIntent::from_form`] is
//! the only way to build one.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;

use crate::phone::{self, NormalizedPhone};

/// Smallest amount the gateway will transact, in major currency units.
pub const MIN_DONATION_AMOUNT: u64 = 100;

/// Positive decimal amount with at most two fractional digits.
///
/// Stored in hundredths so comparisons and formatting are exact. Serializes
/// as a JSON number (`5000`, `5000.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    hundredths: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount `{0}`")]
pub struct AmountParseError(pub String);

impl Amount {
    pub fn from_major(units: u64) -> Self {
        Self {
            hundredths: units.saturating_mul(100),
        }
    }

    pub fn hundredths(&self) -> u64 {
        self.hundredths
    }

    pub fn is_at_least(&self, units: u64) -> bool {
        self.hundredths >= units.saturating_mul(100)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Accepts `5000`, `5000.5`, `5 000`, `5000,50`; rejects signs,
    /// exponents, zero and more than two decimals.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || AmountParseError(raw.to_string());
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ',' { '.' } else { c })
            .collect();
        if cleaned.is_empty() {
            return Err(invalid());
        }

        let (whole_part, fraction_part) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (cleaned.as_str(), ""),
        };
        if whole_part.is_empty()
            || !whole_part.chars().all(|c| c.is_ascii_digit())
            || !fraction_part.chars().all(|c| c.is_ascii_digit())
            || fraction_part.len() > 2
        {
            return Err(invalid());
        }

        let whole = whole_part.parse::<u64>().map_err(|_| invalid())?;
        let fraction = match fraction_part.len() {
            0 => 0,
            1 => fraction_part.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction_part.parse::<u64>().map_err(|_| invalid())?,
        };

        let hundredths = whole
            .checked_mul(100)
            .and_then(|base| base.checked_add(fraction))
            .ok_or_else(invalid)?;
        if hundredths == 0 {
            return Err(invalid());
        }
        Ok(Self { hundredths })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.hundredths / 100;
        let fraction = self.hundredths % 100;
        if fraction == 0 {
            write!(f, "{whole}")
        } else {
            write!(f, "{whole}.{fraction:02}")
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.hundredths % 100 == 0 {
            serializer.serialize_u64(self.hundredths / 100)
        } else {
            serializer.serialize_f64(self.hundredths as f64 / 100.0)
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n.to_string().parse().map_err(de::Error::custom),
            serde_json::Value::String(s) => s.parse().map_err(de::Error::custom),
            other => Err(de::Error::custom(format!("invalid amount: {other}"))),
        }
    }
}

/// Giving cadence chosen by the donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DonationType {
    #[default]
    Unique,
    Mensuel,
    Annuel,
}

impl DonationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationType::Unique => "unique",
            DonationType::Mensuel => "mensuel",
            DonationType::Annuel => "annuel",
        }
    }
}

impl fmt::Display for DonationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationType {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "unique" | "one_time" => Ok(DonationType::Unique),
            "mensuel" | "monthly" => Ok(DonationType::Mensuel),
            "annuel" | "yearly" | "annual" => Ok(DonationType::Annuel),
            other => Err(ValidationError::InvalidDonationType(other.to_string())),
        }
    }
}

/// A pre-submission rule the donor's input broke.
///
/// The display text is shown to the donor as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter the amount you wish to give.")]
    AmountMissing,

    #[error("The amount must be a number with at most two decimals.")]
    AmountInvalid,

    #[error("The minimum donation is 100 XAF.")]
    AmountTooLow,

    #[error("Please enter a valid phone number (for example 6XX XX XX XX).")]
    InvalidPhone,

    #[error("Please enter your name.")]
    MissingName,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Unknown donation type `{0}`.")]
    InvalidDonationType(String),
}

impl ValidationError {
    /// Form field the message belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::AmountMissing
            | ValidationError::AmountInvalid
            | ValidationError::AmountTooLow => "amount",
            ValidationError::InvalidPhone => "donor_phone",
            ValidationError::MissingName => "donor_name",
            ValidationError::InvalidEmail => "donor_email",
            ValidationError::InvalidDonationType(_) => "donation_type",
        }
    }
}

/// Raw donation form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DonationForm {
    /// Amount as typed (e.g. "5000"); JSON numbers are accepted too.
    #[serde(default, deserialize_with = "typed_amount")]
    #[schema(value_type = Option<String>)]
    pub amount: Option<String>,
    /// ISO 4217 currency; the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub donor_name: String,
    #[serde(default)]
    pub donor_email: String,
    #[serde(default)]
    pub donor_phone: String,
    /// `unique`, `mensuel` or `annuel`.
    #[serde(default)]
    pub donation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Optional project the gift is earmarked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// Validated donation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationIntent {
    pub amount: Amount,
    pub currency: String,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: NormalizedPhone,
    pub donation_type: DonationType,
    pub message: Option<String>,
    pub project: Option<String>,
}

impl DonationIntent {
    /// Validate in order: amount, phone, name, email. The first broken rule
    /// wins.
    pub fn from_form(form: DonationForm, default_currency: &str) -> Result<Self, ValidationError> {
        let raw_amount = non_empty(form.amount).ok_or(ValidationError::AmountMissing)?;
        let amount: Amount = raw_amount
            .parse()
            .map_err(|_| ValidationError::AmountInvalid)?;
        if !amount.is_at_least(MIN_DONATION_AMOUNT) {
            return Err(ValidationError::AmountTooLow);
        }

        let donor_phone = phone::normalize(&form.donor_phone);
        if !donor_phone.is_valid() {
            return Err(ValidationError::InvalidPhone);
        }

        let donor_name: String = form.donor_name.trim().nfc().collect();
        if donor_name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let donor_email = form.donor_email.trim().to_string();
        if !donor_email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }

        let donation_type: DonationType = form.donation_type.parse()?;
        let currency = non_empty(form.currency)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| default_currency.to_string());

        Ok(Self {
            amount,
            currency,
            donor_name,
            donor_email,
            donor_phone,
            donation_type,
            message: non_empty(form.message),
            project: non_empty(form.project),
        })
    }

    /// Human-readable description sent to the gateway.
    pub fn description(&self) -> String {
        format!("Don {} - {}", self.donation_type, self.donor_name)
    }
}

fn typed_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> DonationForm {
        DonationForm {
            amount: Some("5000".to_string()),
            currency: None,
            donor_name: "Jean Dupont".to_string(),
            donor_email: "jean@x.cm".to_string(),
            donor_phone: "690123456".to_string(),
            donation_type: "unique".to_string(),
            message: Some("  ".to_string()),
            project: Some("Construction".to_string()),
        }
    }

    #[test]
    fn amount_parses_common_shapes() {
        assert_eq!("5000".parse::<Amount>().unwrap(), Amount::from_major(5000));
        assert_eq!("5 000".parse::<Amount>().unwrap(), Amount::from_major(5000));
        assert_eq!("25.5".parse::<Amount>().unwrap().hundredths(), 2550);
        assert_eq!("25,05".parse::<Amount>().unwrap().hundredths(), 2505);
    }

    #[test]
    fn amount_rejects_garbage() {
        for raw in ["", "abc", "-5", "0", "1.234", "1e3", ".5", "1.2.3"] {
            assert!(raw.parse::<Amount>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn amount_displays_and_serializes_without_trailing_zeros() {
        let whole = Amount::from_major(5000);
        assert_eq!(whole.to_string(), "5000");
        assert_eq!(serde_json::to_string(&whole).unwrap(), "5000");

        let fractional: Amount = "100.5".parse().unwrap();
        assert_eq!(fractional.to_string(), "100.50");
        assert_eq!(serde_json::to_string(&fractional).unwrap(), "100.5");
    }

    #[test]
    fn amount_deserializes_from_number_or_string() {
        let from_number: Amount = serde_json::from_str("5000").unwrap();
        let from_string: Amount = serde_json::from_str("\"5000\"").unwrap();
        let from_float: Amount = serde_json::from_str("100.5").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_float.hundredths(), 10050);
    }

    #[test]
    fn valid_form_builds_intent() {
        let intent = DonationIntent::from_form(valid_form(), "XAF").expect("valid form");
        assert_eq!(intent.amount, Amount::from_major(5000));
        assert_eq!(intent.currency, "XAF");
        assert_eq!(intent.donor_phone.as_str(), "237690123456");
        assert_eq!(intent.donation_type, DonationType::Unique);
        assert_eq!(intent.message, None);
        assert_eq!(intent.project.as_deref(), Some("Construction"));
        assert_eq!(intent.description(), "Don unique - Jean Dupont");
    }

    #[test]
    fn amount_rules_come_first() {
        let mut form = valid_form();
        form.amount = None;
        form.donor_phone = "123".to_string();
        assert_eq!(
            DonationIntent::from_form(form.clone(), "XAF"),
            Err(ValidationError::AmountMissing)
        );

        form.amount = Some("50".to_string());
        let error = DonationIntent::from_form(form, "XAF").unwrap_err();
        assert_eq!(error, ValidationError::AmountTooLow);
        assert!(error.to_string().contains("100"));
        assert_eq!(error.field(), "amount");
    }

    #[test]
    fn minimum_amount_is_inclusive() {
        let mut form = valid_form();
        form.amount = Some("100".to_string());
        assert!(DonationIntent::from_form(form.clone(), "XAF").is_ok());
        form.amount = Some("99.99".to_string());
        assert_eq!(
            DonationIntent::from_form(form, "XAF"),
            Err(ValidationError::AmountTooLow)
        );
    }

    #[test]
    fn phone_rule_precedes_name_and_email() {
        let mut form = valid_form();
        form.donor_phone = "123".to_string();
        form.donor_name = String::new();
        form.donor_email = "nope".to_string();
        let error = DonationIntent::from_form(form, "XAF").unwrap_err();
        assert_eq!(error, ValidationError::InvalidPhone);
        assert!(error.to_string().contains("phone"));
    }

    #[test]
    fn name_then_email_rules() {
        let mut form = valid_form();
        form.donor_name = "   ".to_string();
        form.donor_email = "nope".to_string();
        assert_eq!(
            DonationIntent::from_form(form.clone(), "XAF"),
            Err(ValidationError::MissingName)
        );

        form.donor_name = "Marie".to_string();
        assert_eq!(
            DonationIntent::from_form(form, "XAF"),
            Err(ValidationError::InvalidEmail)
        );
    }

    #[test]
    fn donation_type_aliases() {
        assert_eq!("".parse::<DonationType>().unwrap(), DonationType::Unique);
        assert_eq!("Mensuel".parse::<DonationType>().unwrap(), DonationType::Mensuel);
        assert_eq!("yearly".parse::<DonationType>().unwrap(), DonationType::Annuel);

        let mut form = valid_form();
        form.donation_type = "weekly".to_string();
        assert_eq!(
            DonationIntent::from_form(form, "XAF"),
            Err(ValidationError::InvalidDonationType("weekly".to_string()))
        );
    }

    #[test]
    fn form_accepts_numeric_amount() {
        let form: DonationForm = serde_json::from_str(
            r#"{"amount":5000,"donor_name":"Jean","donor_email":"j@x.cm","donor_phone":"690123456"}"#,
        )
        .unwrap();
        assert_eq!(form.amount.as_deref(), Some("5000"));
        assert_eq!(form.donation_type, "");
    }

    #[test]
    fn explicit_currency_is_uppercased() {
        let mut form = valid_form();
        form.currency = Some("xaf".to_string());
        let intent = DonationIntent::from_form(form, "EUR").unwrap();
        assert_eq!(intent.currency, "XAF");
    }
}
