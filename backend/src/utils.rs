use bigdecimal::{BigDecimal, FromPrimitive, Zero};

use crate::errors::AppError;

/// Decimal places used for every percentage and money figure we report.
pub const REPORT_SCALE: i64 = 2;

/// `round(numerator / denominator * 100, 2)`.
///
/// A zero denominator is reported as `DivisionUndefined`; callers decide
/// how to render it.
pub fn ratio_percent(numerator: &BigDecimal, denominator: &BigDecimal) -> Result<BigDecimal, AppError> {
    if denominator.is_zero() {
        return Err(AppError::DivisionUndefined(format!(
            "{} / 0 has no percentage",
            numerator
        )));
    }
    let pct = numerator / denominator * BigDecimal::from(100i64);
    Ok(pct.round(REPORT_SCALE))
}

/// Converts a provider float into a decimal rounded to `scale` places.
pub fn decimal_from_f64(value: f64, scale: i64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    BigDecimal::from_f64(value).map(|d| d.round(scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ratio_percent_rounds_to_two_places() {
        let pct = ratio_percent(&BigDecimal::from(200i64), &BigDecimal::from(1500i64)).unwrap();
        assert_eq!(pct, BigDecimal::from_str("13.33").unwrap());
    }

    #[test]
    fn test_ratio_percent_zero_denominator() {
        let result = ratio_percent(&BigDecimal::from(5i64), &BigDecimal::zero());
        assert!(matches!(result, Err(AppError::DivisionUndefined(_))));
    }

    #[test]
    fn test_decimal_from_f64_rejects_nan() {
        assert!(decimal_from_f64(f64::NAN, 2).is_none());
        assert_eq!(
            decimal_from_f64(170.004, 2).unwrap(),
            BigDecimal::from_str("170.00").unwrap()
        );
    }
}
