//! Dentist fee models.
//!
//! The clinic pays dentists under two different commercial arrangements and
//! the two must stay separate:
//!
//! * [`FeeModel::PackageShare`] (corporate wellness): one fee per member,
//!   a share of the whole discounted package price.
//! * [`FeeModel::PerTreatment`] (outreach programs and the Dental Saving
//!   Plan): a fee per treatment performed, either stored on the treatment row
//!   or a share of that treatment's original price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProjectionError;
use super::common::{fraction, validate_non_negative};
use super::pricing::{CostBasis, compute_adjusted_price};
use crate::{ProgramKind, TreatmentRecord};

/// Standard dentist share, in percent.
pub const DENTIST_FEE_PERCENT: Decimal = Decimal::TEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeModel {
    /// `rate` percent of the summed, discounted package price.
    PackageShare { rate: Decimal },
    /// Stored fee per treatment, or `default_rate` percent of its original
    /// price when none is stored.
    PerTreatment { default_rate: Decimal },
}

impl FeeModel {
    /// The fee model a program is contracted under.
    pub fn for_program(kind: ProgramKind) -> Self {
        match kind {
            ProgramKind::CorporateWellness => Self::PackageShare {
                rate: DENTIST_FEE_PERCENT,
            },
            ProgramKind::SchoolOutreach
            | ProgramKind::AgeCareOutreach
            | ProgramKind::SpecialNeedsOutreach => Self::per_treatment(),
        }
    }

    /// Fee model of the Dental Saving Plan add-on.
    pub fn dental_saving_plan() -> Self {
        Self::per_treatment()
    }

    fn per_treatment() -> Self {
        Self::PerTreatment {
            default_rate: DENTIST_FEE_PERCENT,
        }
    }

    /// The single fee charged per member under the package model.
    /// Zero under the per-treatment model.
    pub fn shared_fee(
        &self,
        discounted_package_price: Decimal,
    ) -> Decimal {
        match self {
            Self::PackageShare { rate } => discounted_package_price * fraction(*rate),
            Self::PerTreatment { .. } => Decimal::ZERO,
        }
    }

    /// The fee charged each time `record` is performed.
    /// Zero under the package model, which charges a shared fee instead.
    pub fn treatment_fee(
        &self,
        record: &TreatmentRecord,
    ) -> Decimal {
        match self {
            Self::PackageShare { .. } => Decimal::ZERO,
            Self::PerTreatment { default_rate } => record
                .dentist_fee
                .unwrap_or_else(|| record.original_price * fraction(*default_rate)),
        }
    }

    /// Resolves the unit price and unit cost of `record` at `discount_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] for negative amounts on the record or a
    /// discount outside `[0, 100]`.
    pub fn cost_basis(
        &self,
        record: &TreatmentRecord,
        discount_rate: Decimal,
        include_sedation: bool,
    ) -> Result<CostBasis, ProjectionError> {
        let field = |what: &str| format!("{what} of '{}'", record.name);

        validate_non_negative(&field("material cost"), record.cost_material)?;
        if let Some(fee) = record.dentist_fee {
            validate_non_negative(&field("dentist fee"), fee)?;
        }

        let sedation_cost = if include_sedation {
            record.sedation_cost.unwrap_or_default()
        } else {
            Decimal::ZERO
        };
        validate_non_negative(&field("sedation cost"), sedation_cost)?;

        Ok(CostBasis {
            adjusted_price: compute_adjusted_price(record.original_price, discount_rate)?,
            cost_material: record.cost_material,
            dentist_fee: self.treatment_fee(record),
            sedation_cost,
        })
    }
}
