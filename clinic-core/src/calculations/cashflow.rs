//! Combined monthly cashflow across programs.

use rust_decimal::Decimal;
use tracing::debug;

use crate::{CashflowEntry, CashflowSeries, CashflowSummary};

/// The set of program cashflows currently included in the comparison.
#[derive(Debug, Clone, Default)]
pub struct CashflowBoard {
    series: Vec<CashflowSeries>,
}

impl CashflowBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Includes a program's cashflow. A series with the same program label
    /// is replaced.
    pub fn add(
        &mut self,
        series: CashflowSeries,
    ) {
        match self.series.iter_mut().find(|s| s.program == series.program) {
            Some(existing) => *existing = series,
            None => self.series.push(series),
        }
    }

    /// Removes a program's cashflow, returning it if it was included.
    pub fn remove(
        &mut self,
        program: &str,
    ) -> Option<CashflowSeries> {
        let index = self.series.iter().position(|s| s.program == program)?;
        Some(self.series.remove(index))
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    pub fn programs(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.program.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Sums revenue and expense per month across every included program.
    /// Months appear in the order they are first seen.
    pub fn combine(&self) -> Vec<CashflowEntry> {
        let mut combined: Vec<CashflowEntry> = Vec::new();

        for entry in self.series.iter().flat_map(|s| s.entries.iter()) {
            match combined.iter_mut().find(|c| c.month == entry.month) {
                Some(month) => {
                    month.revenue += entry.revenue;
                    month.expense += entry.expense;
                }
                None => combined.push(entry.clone()),
            }
        }

        combined
    }

    /// Average monthly revenue and expense of the combined cashflow.
    /// Zero when no months are included.
    pub fn average(&self) -> CashflowSummary {
        let combined = self.combine();
        if combined.is_empty() {
            return CashflowSummary::default();
        }

        let months = Decimal::from(combined.len());
        let revenue: Decimal = combined.iter().map(|c| c.revenue).sum();
        let expense: Decimal = combined.iter().map(|c| c.expense).sum();

        debug!(months = combined.len(), "cashflow averaged");

        CashflowSummary {
            avg_total_revenue: revenue / months,
            avg_total_expense: expense / months,
        }
    }
}
