use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cost component of running one outreach event (venue, kits, transport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCostItem {
    pub component: String,
    pub unit_quantity: Decimal,
    pub cost_per_unit: Decimal,
}

impl EventCostItem {
    pub fn total(&self) -> Decimal {
        self.unit_quantity * self.cost_per_unit
    }
}
