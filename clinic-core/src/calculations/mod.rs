//! Financial projection calculations for the clinic's programs.
//!
//! Data flows one way: reference tables and user parameters go into the
//! pricing engine, per-treatment results are aggregated per program, and the
//! aggregate may be saved to a [`crate::ledger::ScenarioLedger`].

pub mod cashflow;
pub mod common;
pub mod fee_model;
pub mod pricing;
pub mod programs;

use rust_decimal::Decimal;
use thiserror::Error;

pub use cashflow::CashflowBoard;
pub use fee_model::FeeModel;
pub use pricing::{CostBasis, compute_adjusted_price, compute_demand, compute_per_item_financials};
pub use programs::{
    OutreachCalculator, OutreachProjection, WellnessCalculator, WellnessProjection,
};

/// Errors that abort a single projection.
///
/// None of these are ever turned into a zero-valued result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    /// A percentage input fell outside `[0, 100]`.
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentageOutOfRange { field: String, value: Decimal },

    /// An amount or population that must not be negative was negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeValue { field: String, value: Decimal },

    /// The wellness subscription must last at least one year, and its months
    /// must fit in a `u32`.
    #[error("subscription length must be at least one year and at most {max} years, got {0}", max = u32::MAX / 12)]
    InvalidSubscriptionLength(u32),

    /// The population segments add up to more than a `u64` can count.
    #[error("total population of the segments is too large")]
    PopulationOverflow,

    /// The outreach calculator was handed a non-outreach program.
    #[error("{0} is not an outreach program")]
    NotAnOutreachProgram(crate::ProgramKind),

    /// A selected treatment is absent from its reference table.
    #[error("treatment '{name}' not found in {table}")]
    TreatmentNotFound { table: String, name: String },

    /// A required fixed-fee row is absent from its reference table.
    #[error("fixed fee '{component}' not found in {table}")]
    FixedFeeNotFound { table: String, component: String },

    /// A ceiling-rounded count does not fit in `u64`.
    #[error("count {0} is too large")]
    CountOverflow(Decimal),
}
