//! Conversions between quoted odds formats and implied probability.
//!
//! Everything downstream works in implied probability (`0 < p < 1`, lower is a
//! better price for the bettor). Books quote either American odds (`+150`,
//! `-200`) or decimal odds (`2.50`), so this module is the single place where
//! those strings are turned into probabilities and back.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Signed American odds with at least three digits. Some books render the
/// minus as U+2212.
static AMERICAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[-+\x{2212}])(?P<num>[0-9]{3,})$").expect("american odds pattern")
});

/// Decimal odds below 10.0 (`2.50`).
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9]\.[0-9]+$").expect("decimal odds pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OddsFormatError {
    #[error("invalid odds input: {0:?}")]
    Unrecognized(String),

    #[error("implied probability out of range: {0}")]
    OutOfRange(String),
}

/// Parses American or decimal odds into an implied probability.
///
/// # Errors
///
/// Returns [`OddsFormatError::Unrecognized`] when the string matches neither format.
pub fn parse_odds(odds: &str) -> Result<f64, OddsFormatError> {
    let odds = odds.trim();
    if AMERICAN.is_match(odds) {
        american_to_implied(odds)
    } else if DECIMAL.is_match(odds) {
        decimal_to_implied(odds)
    } else {
        Err(OddsFormatError::Unrecognized(odds.to_string()))
    }
}

/// Converts American odds (`+150`, `-200`, 3+ digits) to implied probability.
///
/// # Errors
///
/// Returns [`OddsFormatError::Unrecognized`] for anything that is not signed American odds.
pub fn american_to_implied(odds: &str) -> Result<f64, OddsFormatError> {
    let odds = odds.trim();
    let unrecognized = || OddsFormatError::Unrecognized(odds.to_string());
    let caps = AMERICAN.captures(odds).ok_or_else(unrecognized)?;

    let favourite = &caps["sign"] != "+";
    let num: f64 = caps["num"].parse().map_err(|_| unrecognized())?;

    let ip = if favourite {
        num / (num + 100.0)
    } else {
        100.0 / (num + 100.0)
    };
    tracing::trace!(odds, ip, "American odds converted");
    Ok(ip)
}

/// Converts decimal odds (`2.50`) to implied probability.
///
/// # Errors
///
/// Returns [`OddsFormatError::Unrecognized`] for anything that is not `[1-9].digits`.
pub fn decimal_to_implied(odds: &str) -> Result<f64, OddsFormatError> {
    let odds = odds.trim();
    if !DECIMAL.is_match(odds) {
        return Err(OddsFormatError::Unrecognized(odds.to_string()));
    }
    let value: f64 = odds
        .parse()
        .map_err(|_| OddsFormatError::Unrecognized(odds.to_string()))?;
    let ip = 1.0 / value;
    tracing::trace!(odds, ip, "Decimal odds converted");
    Ok(ip)
}

/// Renders an implied probability as American odds.
///
/// # Errors
///
/// Returns [`OddsFormatError::OutOfRange`] unless `0 < ip < 1`.
pub fn implied_to_american(ip: f64) -> Result<String, OddsFormatError> {
    if !(ip > 0.0 && ip < 1.0) {
        return Err(OddsFormatError::OutOfRange(ip.to_string()));
    }
    if ip < 0.5 {
        Ok(format!("+{}", ((1.0 - ip) / ip * 100.0).round() as i64))
    } else {
        Ok(format!("-{}", (ip / (1.0 - ip) * 100.0).round() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== American Odds ====================

    #[test]
    fn test_american_underdog() {
        let ip = american_to_implied("+150").unwrap();
        assert!((ip - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_american_favourite() {
        let ip = american_to_implied("-200").unwrap();
        assert!((ip - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_american_even_money() {
        assert!((american_to_implied("+100").unwrap() - 0.5).abs() < 1e-12);
        assert!((american_to_implied("-100").unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_american_unicode_minus() {
        let ip = american_to_implied("\u{2212}150").unwrap();
        assert!((ip - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_american_rejects_short_or_unsigned() {
        assert!(american_to_implied("+15").is_err());
        assert!(american_to_implied("150").is_err());
        assert!(american_to_implied("+1a0").is_err());
        assert!(american_to_implied("").is_err());
        assert!(american_to_implied("+150x").is_err());
        assert!(american_to_implied("x-150").is_err());
    }

    // ==================== Decimal Odds ====================

    #[test]
    fn test_decimal_odds() {
        assert!((decimal_to_implied("2.50").unwrap() - 0.4).abs() < 1e-12);
        assert!((decimal_to_implied("2.0").unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_decimal_rejects_bad_shapes() {
        assert!(decimal_to_implied("0.5").is_err());
        assert!(decimal_to_implied("12.5").is_err());
        assert!(decimal_to_implied("2.").is_err());
        assert!(decimal_to_implied("2").is_err());
        assert!(decimal_to_implied("2.5.0").is_err());
    }

    #[test]
    fn test_parse_odds_dispatch() {
        assert!((parse_odds("+300").unwrap() - 0.25).abs() < 1e-12);
        assert!((parse_odds(" 4.00 ").unwrap() - 0.25).abs() < 1e-12);
        assert_eq!(
            parse_odds("evens"),
            Err(OddsFormatError::Unrecognized("evens".to_string()))
        );
    }

    // ==================== Rendering ====================

    #[test]
    fn test_implied_to_american() {
        assert_eq!(implied_to_american(0.4).unwrap(), "+150");
        assert_eq!(implied_to_american(2.0 / 3.0).unwrap(), "-200");
        assert_eq!(implied_to_american(0.5).unwrap(), "-100");
    }

    #[test]
    fn test_implied_to_american_out_of_range() {
        assert!(implied_to_american(0.0).is_err());
        assert!(implied_to_american(1.0).is_err());
        assert!(implied_to_american(f64::NAN).is_err());
    }
}
