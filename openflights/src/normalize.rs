//! Conversion of raw CSV fields into typed values.
//!
//! The dataset marks missing values either with an empty field or with the `\N` token. Both map
//! to `None`; every other value is trimmed before conversion.

use std::num::ParseIntError;
use std::str::FromStr;

use bigdecimal::BigDecimal;

/// Token the dataset uses for a missing value.
pub const NULL_TOKEN: &str = r"\N";

/// Trims `raw` and maps missing markers to `None`.
pub fn normalize(raw: Option<&str>) -> Option<&str> {
    let value = raw?.trim();
    if value.is_empty() || value == NULL_TOKEN {
        None
    } else {
        Some(value)
    }
}

/// Normalizes `raw` into an owned string.
pub fn to_string(raw: Option<&str>) -> Option<String> {
    normalize(raw).map(str::to_string)
}

/// Parses `raw` as a base-10 integer. Missing values are `Ok(None)`.
pub fn to_int(raw: Option<&str>) -> Result<Option<i64>, ParseIntError> {
    normalize(raw).map(i64::from_str).transpose()
}

/// Parses `raw` as a fixed point decimal. Unparsable values are treated as missing.
pub fn to_decimal(raw: Option<&str>) -> Option<BigDecimal> {
    normalize(raw).and_then(|value| BigDecimal::from_str(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_markers_become_none() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("")), None);
        assert_eq!(normalize(Some("   ")), None);
        assert_eq!(normalize(Some(r"\N")), None);
        assert_eq!(normalize(Some(r" \N ")), None);
    }

    #[test]
    fn values_are_trimmed() {
        assert_eq!(normalize(Some("  Copenhagen ")), Some("Copenhagen"));
        assert_eq!(to_string(Some(" EKCH")), Some("EKCH".to_string()));
    }

    #[test]
    fn integers_are_parsed_strictly() {
        assert_eq!(to_int(Some(" 112 ")), Ok(Some(112)));
        assert_eq!(to_int(Some("-17")), Ok(Some(-17)));
        assert_eq!(to_int(Some(r"\N")), Ok(None));
        assert!(to_int(Some("12a")).is_err());
        assert!(to_int(Some("1.5")).is_err());
    }

    #[test]
    fn unparsable_decimals_are_treated_as_missing() {
        assert_eq!(
            to_decimal(Some("55.618099212646484")),
            Some(BigDecimal::from_str("55.618099212646484").unwrap())
        );
        assert_eq!(to_decimal(Some("-9.5")), Some(BigDecimal::from_str("-9.5").unwrap()));
        assert_eq!(to_decimal(Some("U")), None);
        assert_eq!(to_decimal(Some("")), None);
    }
}
