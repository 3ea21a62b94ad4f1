use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Parses a numeric cell leniently.
///
/// Accepts surrounding whitespace, `,` thousands separators and scientific
/// notation. Returns `None` for empty or non-numeric input (including `NaN`
/// and infinities).
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    if let Ok(value) = Decimal::from_str(&cleaned) {
        return Some(value);
    }
    if let Ok(value) = Decimal::from_scientific(&cleaned) {
        return Some(value);
    }

    let float = cleaned.parse::<f64>().ok()?;
    if !float.is_finite() {
        return None;
    }
    Decimal::from_f64(float)
}

/// Parses an integer year cell, tolerating `"2008.0"` style exports.
#[must_use]
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    let value = parse_decimal(trimmed)?;
    if value.fract().is_zero() {
        value.to_i32()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{parse_decimal, parse_year};

    #[test]
    fn parses_plain_and_grouped_numbers() {
        assert_eq!(parse_decimal(" 42 "), Some(Decimal::from(42)));
        assert_eq!(parse_decimal("1,234,567"), Some(Decimal::from(1_234_567)));
        assert_eq!(parse_decimal("0.25"), Some(Decimal::new(25, 2)));
    }

    #[test]
    fn parses_scientific_notation() {
        assert_eq!(parse_decimal("1.5e3"), Some(Decimal::from(1_500)));
    }

    #[test]
    fn rejects_non_numeric_and_non_finite() {
        assert_eq!(parse_decimal("bad"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("inf"), None);
    }

    #[test]
    fn parses_integral_years_only() {
        assert_eq!(parse_year("2008"), Some(2008));
        assert_eq!(parse_year("2008.0"), Some(2008));
        assert_eq!(parse_year("2008.5"), None);
        assert_eq!(parse_year("n/a"), None);
    }
}
