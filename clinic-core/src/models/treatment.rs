use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::ProjectionError;

/// A single priced treatment from a reference table.
///
/// `dentist_fee` is only stored for tables that carry it explicitly; fee
/// models derive it from the price otherwise. `sedation_cost` is only
/// meaningful for the special-needs program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentRecord {
    pub name: String,
    pub original_price: Decimal,
    pub cost_material: Decimal,
    pub dentist_fee: Option<Decimal>,
    /// Share (0-100) of the joined population expected to take this treatment.
    pub conversion_rate: Decimal,
    /// Default discount (0-100) applied to `original_price`.
    pub discount_rate: Decimal,
    pub sedation_cost: Option<Decimal>,
}

/// An ordered, immutable table of treatments keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentTable {
    label: String,
    records: Vec<TreatmentRecord>,
}

impl TreatmentTable {
    pub fn new(
        label: impl Into<String>,
        records: Vec<TreatmentRecord>,
    ) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn records(&self) -> &[TreatmentRecord] {
        &self.records
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Looks up a treatment by name.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::TreatmentNotFound`] when no row carries `name`.
    pub fn get(
        &self,
        name: &str,
    ) -> Result<&TreatmentRecord, ProjectionError> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ProjectionError::TreatmentNotFound {
                table: self.label.clone(),
                name: name.to_string(),
            })
    }
}

/// The caller's choice of a treatment, with optional edits that override the
/// reference row for this computation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentSelection {
    pub name: String,
    pub conversion_rate: Option<Decimal>,
    pub discount_rate: Option<Decimal>,
}

impl TreatmentSelection {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conversion_rate: None,
            discount_rate: None,
        }
    }

    pub fn with_conversion_rate(
        mut self,
        rate: Decimal,
    ) -> Self {
        self.conversion_rate = Some(rate);
        self
    }

    pub fn with_discount_rate(
        mut self,
        rate: Decimal,
    ) -> Self {
        self.discount_rate = Some(rate);
        self
    }
}
