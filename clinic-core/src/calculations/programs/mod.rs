//! Program-level aggregation on top of the pricing engine.

pub mod outreach;
pub mod wellness;

use std::collections::HashSet;

use rust_decimal::Decimal;

pub use outreach::{OutreachCalculator, OutreachProjection};
pub use wellness::{WellnessCalculator, WellnessProjection};

use super::ProjectionError;
use super::common::validate_percentage;
use crate::{TreatmentRecord, TreatmentSelection};

/// Conversion and discount rates in effect for one selected treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EffectiveRates {
    conversion_rate: Decimal,
    discount_rate: Decimal,
}

/// Applies the caller's overrides on top of the reference row without
/// touching it. `default_discount` is used when the selection has none.
fn effective_rates(
    record: &TreatmentRecord,
    selection: &TreatmentSelection,
    default_discount: Decimal,
) -> Result<EffectiveRates, ProjectionError> {
    let conversion_rate = selection.conversion_rate.unwrap_or(record.conversion_rate);
    let discount_rate = selection.discount_rate.unwrap_or(default_discount);

    Ok(EffectiveRates {
        conversion_rate: validate_percentage(
            &format!("conversion rate of '{}'", record.name),
            conversion_rate,
        )?,
        discount_rate: validate_percentage(
            &format!("discount rate of '{}'", record.name),
            discount_rate,
        )?,
    })
}

/// Drops repeated selections of the same treatment, keeping the first.
fn unique_selections(selections: &[TreatmentSelection]) -> Vec<&TreatmentSelection> {
    let mut seen = HashSet::new();
    selections
        .iter()
        .filter(|s| seen.insert(s.name.as_str()))
        .collect()
}
