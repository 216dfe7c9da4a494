use std::str::FromStr;

use bigdecimal::BigDecimal;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use thiserror::Error;

/// Precision of a fixed point decimal column, mirroring SQL `decimal(max_digits, decimal_places)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalPrecision {
    pub max_digits: u32,
    pub decimal_places: u32,
}

/// Precision of `latitude` and `longitude`, `decimal(9, 6)`.
pub const COORDINATE_PRECISION: DecimalPrecision = DecimalPrecision {
    max_digits: 9,
    decimal_places: 6,
};

/// Precision of `timezone_hrs`, `decimal(4, 2)`.
pub const TIMEZONE_PRECISION: DecimalPrecision = DecimalPrecision {
    max_digits: 4,
    decimal_places: 2,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrecisionError {
    #[error("Ensure that there are no more than {0} digits in total.")]
    TooManyDigits(u32),

    #[error("Ensure that there are no more than {0} decimal places.")]
    TooManyDecimalPlaces(u32),

    #[error("Ensure that there are no more than {0} digits before the decimal point.")]
    TooManyWholeDigits(u32),
}

impl DecimalPrecision {
    /// Checks that `value` fits this precision once trailing zeros are dropped.
    pub fn check(&self, value: &BigDecimal) -> Result<(), PrecisionError> {
        let (digits, scale) = value.normalized().as_bigint_and_exponent();
        let digit_count = digits.to_string().trim_start_matches('-').len() as i64;

        let (total_digits, whole_digits, decimal_places) = if scale <= 0 {
            let total = digit_count - scale;
            (total, total, 0)
        } else if digit_count > scale {
            (digit_count, digit_count - scale, scale)
        } else {
            (scale, 0, scale)
        };

        if total_digits > self.max_digits as i64 {
            return Err(PrecisionError::TooManyDigits(self.max_digits));
        }

        if decimal_places > self.decimal_places as i64 {
            return Err(PrecisionError::TooManyDecimalPlaces(self.decimal_places));
        }

        let max_whole_digits = self.max_digits - self.decimal_places;
        if whole_digits > max_whole_digits as i64 {
            return Err(PrecisionError::TooManyWholeDigits(max_whole_digits));
        }

        Ok(())
    }

    /// Rounds `value` to exactly `decimal_places` fractional digits.
    pub fn quantize(&self, value: &BigDecimal) -> BigDecimal {
        let decimal_places = self.decimal_places as i64;
        value.round(decimal_places).with_scale(decimal_places)
    }
}

/// Renders a decimal in the text form stored in the database.
pub fn encode(value: Option<&BigDecimal>) -> Option<String> {
    value.map(BigDecimal::to_plain_string)
}

/// Reads a decimal stored as text from `column`.
pub fn decode(row: &SqliteRow, column: &str) -> Result<Option<BigDecimal>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;

    raw.map(|raw| {
        BigDecimal::from_str(&raw).map_err(|err| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(err),
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[test]
    fn quantize_pads_and_rounds_to_the_column_scale() {
        assert_eq!(
            COORDINATE_PRECISION.quantize(&decimal("55.6181")).to_string(),
            "55.618100"
        );
        assert_eq!(
            COORDINATE_PRECISION
                .quantize(&decimal("12.65599918365478"))
                .to_string(),
            "12.655999"
        );
        assert_eq!(TIMEZONE_PRECISION.quantize(&decimal("1")).to_string(), "1.00");
    }

    #[test]
    fn coordinates_within_precision_are_accepted() {
        assert!(COORDINATE_PRECISION.check(&decimal("103.123456")).is_ok());
        assert!(COORDINATE_PRECISION.check(&decimal("-33.946098")).is_ok());
        assert!(COORDINATE_PRECISION.check(&decimal("1.50000000")).is_ok());
        assert!(TIMEZONE_PRECISION.check(&decimal("-9.5")).is_ok());
    }

    #[test]
    fn precision_violations_are_reported() {
        assert_eq!(
            COORDINATE_PRECISION.check(&decimal("1.2345678")),
            Err(PrecisionError::TooManyDecimalPlaces(6))
        );
        assert_eq!(
            COORDINATE_PRECISION.check(&decimal("1234.5")),
            Err(PrecisionError::TooManyWholeDigits(3))
        );
        assert_eq!(
            TIMEZONE_PRECISION.check(&decimal("123.45")),
            Err(PrecisionError::TooManyDigits(4))
        );
    }
}
