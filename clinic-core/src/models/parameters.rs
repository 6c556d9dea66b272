use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ProgramKind, TreatmentSelection};

/// User inputs for the corporate wellness program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessParameters {
    pub total_potential_employee: u64,
    /// Percentage (0-100) of potential employees expected to join.
    pub conversion_rate: Decimal,
    /// Percentage (0-100) taken off the package price.
    pub discount_package: Decimal,
    pub subscription_length_years: u32,
    /// Package treatments, by name.
    pub selected_treatments: Vec<String>,
    /// Dental Saving Plan add-on treatments.
    pub dsp_selections: Vec<TreatmentSelection>,
}

impl WellnessParameters {
    /// Subscription length in months; `None` if it does not fit in `u32`.
    pub fn subscription_months(&self) -> Option<u32> {
        self.subscription_length_years.checked_mul(12)
    }
}

/// A named slice of an outreach population (students, staff, residents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSegment {
    pub label: String,
    pub count: u64,
}

impl PopulationSegment {
    pub fn new(
        label: impl Into<String>,
        count: u64,
    ) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// User inputs for the school, age-care and special-needs programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachParameters {
    pub program: ProgramKind,
    pub segments: Vec<PopulationSegment>,
    /// Percentage (0-100) of the population expected to join the program.
    pub conversion_rate: Decimal,
    /// Program-wide discount (0-100), unless a selection overrides it.
    pub discount_rate: Decimal,
    /// Number of events needed to reach the conversion rate.
    pub event_frequency: u32,
    pub selections: Vec<TreatmentSelection>,
}

impl OutreachParameters {
    /// Sum of every segment; `None` if it does not fit in `u64`.
    pub fn total_population(&self) -> Option<u64> {
        self.segments
            .iter()
            .try_fold(0u64, |total, s| total.checked_add(s.count))
    }
}
