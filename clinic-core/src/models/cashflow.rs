use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Revenue and expense of one month of a program's cashflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowEntry {
    pub month: String,
    pub revenue: Decimal,
    pub expense: Decimal,
}

/// The monthly cashflow of one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowSeries {
    pub program: String,
    pub entries: Vec<CashflowEntry>,
}

/// Average monthly revenue and expense across the combined cashflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowSummary {
    pub avg_total_revenue: Decimal,
    pub avg_total_expense: Decimal,
}
