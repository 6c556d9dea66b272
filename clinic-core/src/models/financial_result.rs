use std::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Projected demand and money for one treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialResult {
    pub treatment: String,
    pub joining_count: u64,
    pub adjusted_price: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

/// Aggregated revenue, cost and profit of a program or a combination of
/// programs. Profit is always `total_revenue - total_cost`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramTotals {
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
}

impl ProgramTotals {
    pub fn new(
        total_revenue: Decimal,
        total_cost: Decimal,
    ) -> Self {
        Self {
            total_revenue,
            total_cost,
            total_profit: total_revenue - total_cost,
        }
    }

    /// Sums per-treatment rows. Order of the rows does not matter.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a FinancialResult>) -> Self {
        let (revenue, cost) = results
            .into_iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(rev, cost), r| {
                (rev + r.revenue, cost + r.cost)
            });
        Self::new(revenue, cost)
    }

    /// Adds a cost that is not tied to any treatment (events, card fees).
    pub fn with_fixed_cost(
        self,
        amount: Decimal,
    ) -> Self {
        Self::new(self.total_revenue, self.total_cost + amount)
    }

    pub fn combine(
        self,
        other: Self,
    ) -> Self {
        Self::new(
            self.total_revenue + other.total_revenue,
            self.total_cost + other.total_cost,
        )
    }
}

impl Sum for ProgramTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::combine)
    }
}
