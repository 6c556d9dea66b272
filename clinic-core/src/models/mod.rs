mod cashflow;
mod event_cost;
mod financial_result;
mod parameters;
mod price_table;
mod program_kind;
mod reference;
mod scenario;
mod treatment;

pub use cashflow::{CashflowEntry, CashflowSeries, CashflowSummary};
pub use event_cost::EventCostItem;
pub use financial_result::{FinancialResult, ProgramTotals};
pub use parameters::{OutreachParameters, PopulationSegment, WellnessParameters};
pub use price_table::{PriceEntry, PriceTable};
pub use program_kind::ProgramKind;
pub use reference::{MEMBER_CARD_COMPONENT, OutreachReference, WellnessReference};
pub use scenario::{ScenarioComparison, ScenarioMetrics, ScenarioSnapshot};
pub use treatment::{TreatmentRecord, TreatmentSelection, TreatmentTable};
