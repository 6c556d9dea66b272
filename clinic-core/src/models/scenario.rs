use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CashflowSummary, ProgramTotals};

/// The figures a scenario is saved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub avg_total_revenue: Decimal,
    pub avg_total_expense: Decimal,
}

impl From<CashflowSummary> for ScenarioMetrics {
    fn from(summary: CashflowSummary) -> Self {
        Self {
            avg_total_revenue: summary.avg_total_revenue,
            avg_total_expense: summary.avg_total_expense,
        }
    }
}

impl From<ProgramTotals> for ScenarioMetrics {
    fn from(totals: ProgramTotals) -> Self {
        Self {
            avg_total_revenue: totals.total_revenue,
            avg_total_expense: totals.total_cost,
        }
    }
}

/// A saved scenario. Never mutated once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSnapshot {
    pub id: u32,
    pub avg_total_revenue: Decimal,
    pub avg_total_expense: Decimal,
}

impl ScenarioSnapshot {
    pub fn new(
        id: u32,
        metrics: ScenarioMetrics,
    ) -> Self {
        Self {
            id,
            avg_total_revenue: metrics.avg_total_revenue,
            avg_total_expense: metrics.avg_total_expense,
        }
    }

    pub fn profit(&self) -> Decimal {
        self.avg_total_revenue - self.avg_total_expense
    }
}

/// One row of the side-by-side scenario comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub id: u32,
    pub avg_total_revenue: Decimal,
    pub avg_total_expense: Decimal,
    pub profit: Decimal,
}

impl From<&ScenarioSnapshot> for ScenarioComparison {
    fn from(snapshot: &ScenarioSnapshot) -> Self {
        Self {
            id: snapshot.id,
            avg_total_revenue: snapshot.avg_total_revenue,
            avg_total_expense: snapshot.avg_total_expense,
            profit: snapshot.profit(),
        }
    }
}
