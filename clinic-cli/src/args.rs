//! Parsers for the compact command-line forms of engine inputs.
//!
//! | Form | Meaning |
//! |------|---------|
//! | `Whitening` | select a treatment with its table rates |
//! | `Whitening:8` | ... with an 8% conversion rate |
//! | `Whitening:8:15` | ... and a 15% discount |
//! | `Whitening::15` | ... table conversion rate, 15% discount |
//! | `Students=800` | a population segment |
//! | `10=140000` | a hiring tier (minimum hours = hourly fee) |

use clinic_core::{PopulationSegment, ProgramKind, TreatmentSelection};
use clinic_data::{HiringTier, parse_money, parse_percent};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("empty treatment name in '{0}'")]
    EmptyName(String),

    #[error("too many ':' parts in '{0}' (expected NAME[:CONVERSION[:DISCOUNT]])")]
    TooManyParts(String),

    #[error("'{0}' is not a percentage between 0 and 100")]
    Percentage(String),

    #[error("'{0}' is not LABEL=COUNT")]
    Segment(String),

    #[error("'{0}' is not MINIMUM_HOURS=FEE")]
    Tier(String),

    #[error("unknown program '{0}' (expected one of: wellness, school, agecare, special-needs)")]
    Program(String),
}

/// A percentage in `[0, 100]`, with or without a trailing `%`.
pub fn percentage(s: &str) -> Result<Decimal, ArgError> {
    parse_percent(s).map_err(|_| ArgError::Percentage(s.to_string()))
}

fn optional_percentage(part: Option<&str>) -> Result<Option<Decimal>, ArgError> {
    match part.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => percentage(value).map(Some),
    }
}

/// `NAME[:CONVERSION[:DISCOUNT]]`
pub fn treatment_selection(s: &str) -> Result<TreatmentSelection, ArgError> {
    let mut parts = s.split(':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(ArgError::EmptyName(s.to_string()));
    }

    let conversion = optional_percentage(parts.next())?;
    let discount = optional_percentage(parts.next())?;
    if parts.next().is_some() {
        return Err(ArgError::TooManyParts(s.to_string()));
    }

    let mut selection = TreatmentSelection::named(name);
    if let Some(rate) = conversion {
        selection = selection.with_conversion_rate(rate);
    }
    if let Some(rate) = discount {
        selection = selection.with_discount_rate(rate);
    }
    Ok(selection)
}

/// `LABEL=COUNT`
pub fn population_segment(s: &str) -> Result<PopulationSegment, ArgError> {
    let (label, count) = s
        .rsplit_once('=')
        .ok_or_else(|| ArgError::Segment(s.to_string()))?;
    let label = label.trim();
    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|_| ArgError::Segment(s.to_string()))?;
    if label.is_empty() {
        return Err(ArgError::Segment(s.to_string()));
    }
    Ok(PopulationSegment::new(label, count))
}

/// `MINIMUM_HOURS=FEE`, the fee as a number or `Rp` amount.
pub fn hiring_tier(s: &str) -> Result<HiringTier, ArgError> {
    let (hours, fee) = s
        .split_once('=')
        .ok_or_else(|| ArgError::Tier(s.to_string()))?;
    let hours = hours
        .trim()
        .parse::<u32>()
        .map_err(|_| ArgError::Tier(s.to_string()))?;
    let fee = parse_money(fee).map_err(|_| ArgError::Tier(s.to_string()))?;
    Ok(HiringTier::new(hours, fee))
}

pub fn program(s: &str) -> Result<ProgramKind, ArgError> {
    ProgramKind::parse(s.trim()).ok_or_else(|| ArgError::Program(s.to_string()))
}

/// Same as [`program`], restricted to the outreach programs.
pub fn outreach_program(s: &str) -> Result<ProgramKind, ArgError> {
    program(s)
        .ok()
        .filter(ProgramKind::is_outreach)
        .ok_or_else(|| ArgError::Program(s.to_string()))
}
