use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::ProjectionError;

/// One named amount, e.g. a package price or a cost component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub name: String,
    pub amount: Decimal,
}

/// A two-column lookup table of named amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    label: String,
    entries: Vec<PriceEntry>,
}

impl PriceTable {
    pub fn new(
        label: impl Into<String>,
        entries: Vec<PriceEntry>,
    ) -> Self {
        Self {
            label: label.into(),
            entries,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// # Errors
    ///
    /// [`ProjectionError::TreatmentNotFound`] when no row carries `name`.
    pub fn amount_of(
        &self,
        name: &str,
    ) -> Result<Decimal, ProjectionError> {
        self.find(name)
            .ok_or_else(|| ProjectionError::TreatmentNotFound {
                table: self.label.clone(),
                name: name.to_string(),
            })
    }

    /// Sums the amounts of every named row, failing on the first missing one.
    pub fn sum_of<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Decimal, ProjectionError> {
        names
            .into_iter()
            .map(|name| self.amount_of(name))
            .sum()
    }

    pub(crate) fn find(
        &self,
        name: &str,
    ) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.amount)
    }
}
