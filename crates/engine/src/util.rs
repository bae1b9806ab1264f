//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use api_types::ImageFormatType;
use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

const MAX_NAME_LEN: usize = 50;
const MAX_ACCOUNT_NAME_LEN: usize = 40;

/// NFKC-normalize, trim and lowercase a registry name (category,
/// description, parameter).
pub(crate) fn normalize_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.nfkc().collect::<String>().trim().to_lowercase();
    if normalized.is_empty() {
        return Err(EngineError::InvalidValue(format!(
            "{label} name must not be empty"
        )));
    }
    if normalized.chars().count() > MAX_NAME_LEN {
        return Err(EngineError::InvalidValue(format!(
            "{label} name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(normalized)
}

/// Category names are restricted to `[a-z0-9_ -]`.
pub(crate) fn normalize_category_name(value: &str) -> ResultEngine<String> {
    let name = normalize_name(value, "category")?;
    let valid = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | ' ' | '-'));
    if !valid {
        return Err(EngineError::InvalidValue(format!(
            "invalid category name: {name}"
        )));
    }
    Ok(name)
}

/// Account names follow `<name>_<owner>`, e.g. `chase_brian` or
/// `amex-gold_kari`.
pub(crate) fn normalize_account_name_owner(value: &str) -> ResultEngine<String> {
    let name = value.trim().to_lowercase();
    let invalid = || EngineError::InvalidValue(format!("invalid account name: {value}"));

    if name.len() < 3 || name.len() > MAX_ACCOUNT_NAME_LEN {
        return Err(invalid());
    }
    let (account, owner) = name.split_once('_').ok_or_else(invalid)?;
    if !account.chars().all(|c| c.is_ascii_lowercase() || c == '-')
        || !owner.chars().all(|c| c.is_ascii_lowercase())
    {
        return Err(invalid());
    }
    Ok(name)
}

pub(crate) fn validate_moniker(value: &str) -> ResultEngine<()> {
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(EngineError::InvalidValue(format!(
            "moniker must be 4 digits: {value}"
        )))
    }
}

pub(crate) fn validate_ssn_last_four(value: &str) -> ResultEngine<()> {
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(EngineError::InvalidValue(
            "ssnLastFour must be exactly 4 digits".to_string(),
        ))
    }
}

/// Transactions before 2000-01-01 are rejected.
pub(crate) fn validate_transaction_date(date: NaiveDate) -> ResultEngine<()> {
    let min = NaiveDate::from_ymd_opt(2000, 1, 1)
        .ok_or_else(|| EngineError::InvalidValue("invalid minimum date".to_string()))?;
    if date < min {
        return Err(EngineError::InvalidValue(format!(
            "transaction date must be on or after {min}: {date}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_date_range(start: NaiveDate, end: NaiveDate) -> ResultEngine<()> {
    if start > end {
        return Err(EngineError::InvalidValue(format!(
            "start date {start} is after end date {end}"
        )));
    }
    Ok(())
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidValue(format!("invalid {label} id")))
}

/// Detect the image format from its magic bytes.
pub(crate) fn detect_image_format(bytes: &[u8]) -> ImageFormatType {
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    if bytes.starts_with(JPEG) {
        ImageFormatType::Jpeg
    } else if bytes.starts_with(PNG) {
        ImageFormatType::Png
    } else {
        ImageFormatType::Undefined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_nfkc_lowercased() {
        assert_eq!(normalize_name("  Ｇｒｏｃｅｒｉｅｓ ", "category").unwrap(), "groceries");
        assert!(normalize_name("   ", "category").is_err());
    }

    #[test]
    fn category_names_reject_punctuation() {
        assert_eq!(normalize_category_name("Bill_Pay").unwrap(), "bill_pay");
        assert!(normalize_category_name("food & drink").is_err());
    }

    #[test]
    fn account_name_owner_requires_underscore() {
        assert_eq!(
            normalize_account_name_owner("Amex-Gold_Kari").unwrap(),
            "amex-gold_kari"
        );
        assert!(normalize_account_name_owner("chase").is_err());
        assert!(normalize_account_name_owner("chase_br1an").is_err());
        assert!(normalize_account_name_owner("a_b_c").is_err());
    }

    #[test]
    fn dates_before_2000_are_rejected() {
        let old = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        let ok = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert!(validate_transaction_date(old).is_err());
        assert!(validate_transaction_date(ok).is_ok());
    }

    #[test]
    fn image_format_from_magic_bytes() {
        assert_eq!(
            detect_image_format(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormatType::Jpeg
        );
        assert_eq!(
            detect_image_format(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            ImageFormatType::Png
        );
        assert_eq!(detect_image_format(b"GIF89a"), ImageFormatType::Undefined);
    }

    #[test]
    fn short_fields_are_digit_checked() {
        assert!(validate_moniker("0000").is_ok());
        assert!(validate_moniker("12a4").is_err());
        assert!(validate_ssn_last_four("1234").is_ok());
        assert!(validate_ssn_last_four("12345").is_err());
    }
}
