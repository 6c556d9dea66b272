//! Rupiah amounts and percentages as they appear in the reference tables.
//!
//! Currency cells are either plain numbers (`150000`) or Rupiah strings with
//! `.` as thousands separator and no decimals (`Rp150.000`). Percentage cells
//! are either plain numbers (`5`) or carry a percent sign (`5%`).

use std::sync::OnceLock;

use clinic_core::calculations::common::round_currency;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a cell cannot be read as money or a percentage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("'{0}' is not a Rupiah amount (expected e.g. Rp150.000 or 150000)")]
    Malformed(String),

    #[error("amount '{0}' must not be negative")]
    Negative(String),

    #[error("'{0}' is not a percentage between 0 and 100")]
    InvalidPercentage(String),
}

fn rupiah_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Rp\s?\d{1,3}(\.\d{3})*$").expect("rupiah pattern is valid")
    })
}

/// Parses a Rupiah string such as `Rp150.000` into whole currency units.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use clinic_data::currency::parse_rupiah;
///
/// assert_eq!(parse_rupiah("Rp150.000").unwrap(), dec!(150000));
/// assert_eq!(parse_rupiah("Rp 1.250.000").unwrap(), dec!(1250000));
/// assert!(parse_rupiah("Rp150,000.50").is_err());
/// ```
pub fn parse_rupiah(s: &str) -> Result<Decimal, CurrencyError> {
    let trimmed = s.trim();
    if !rupiah_pattern().is_match(trimmed) {
        return Err(CurrencyError::Malformed(s.to_string()));
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse::<Decimal>()
        .map_err(|_| CurrencyError::Malformed(s.to_string()))
}

/// Parses a money cell: a Rupiah string, or a plain number (commas are
/// treated as thousands separators). Negative amounts are rejected.
pub fn parse_money(s: &str) -> Result<Decimal, CurrencyError> {
    let trimmed = s.trim();
    let amount = if trimmed.starts_with("Rp") {
        parse_rupiah(trimmed)?
    } else {
        trimmed
            .replace(',', "")
            .parse::<Decimal>()
            .map_err(|_| CurrencyError::Malformed(s.to_string()))?
    };

    if amount < Decimal::ZERO {
        return Err(CurrencyError::Negative(s.to_string()));
    }
    Ok(amount)
}

/// Parses an optional money cell. Empty cells are `None`.
pub fn parse_optional_money(s: Option<&str>) -> Result<Option<Decimal>, CurrencyError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_money(value).map(Some),
    }
}

/// Parses a percentage cell (`5%` or `5`) in `[0, 100]`.
pub fn parse_percent(s: &str) -> Result<Decimal, CurrencyError> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    let value = number
        .parse::<Decimal>()
        .map_err(|_| CurrencyError::InvalidPercentage(s.to_string()))?;
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(CurrencyError::InvalidPercentage(s.to_string()));
    }
    Ok(value)
}

/// Formats an amount as `Rp1.234.567`, rounded to whole units.
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = round_currency(amount);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}Rp{grouped}")
}

/// Formats a percentage for display, e.g. `12.5%`.
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", value.normalize())
}
