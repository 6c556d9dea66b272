use serde::{Deserialize, Serialize};

use super::{EventCostItem, PriceTable, TreatmentTable};

/// Row of the package cost table holding the recurring member card fee.
pub const MEMBER_CARD_COMPONENT: &str = "Member Card (monthly)";

/// Reference tables consumed by the corporate wellness calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessReference {
    /// Monthly package price per treatment.
    pub package_prices: PriceTable,
    /// Monthly package cost per treatment, plus the member card fee row.
    pub package_costs: PriceTable,
    /// Dental Saving Plan treatments offered on top of the package.
    pub dsp: TreatmentTable,
}

/// Reference tables consumed by the outreach calculators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachReference {
    pub treatments: TreatmentTable,
    pub event_costs: Vec<EventCostItem>,
}
