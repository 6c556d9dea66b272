//! Corporate wellness program projection.
//!
//! Employees subscribe to a monthly treatment package for a number of years;
//! a Dental Saving Plan (DSP) add-on is sold to the same members and
//! projected per treatment.
//!
//! | Figure | Formula |
//! |--------|---------|
//! | joining members | ceil(potential × conversion%) |
//! | months | years × 12 |
//! | package revenue | Σ package prices × (1 − discount%) × members × months |
//! | dentist fee / member | Σ package prices × (1 − discount%) × 10% |
//! | cost / member | dentist fee + member card fee + Σ package costs |
//! | package cost | cost / member × members × months |
//! | DSP demand | ceil(members × treatment conversion%) |
//! | DSP revenue | original price × (1 − DSP discount%) × demand |
//! | DSP cost | (material + 10% of original price) × demand |
//!
//! The dentist fee is computed once from the whole package and charged per
//! member per month, regardless of how many treatments the package holds.
//!
//! DSP revenue is discounted: the selection's discount when given, otherwise
//! the DSP table's `Discount Price` column. A table carrying 0% there sells
//! DSP treatments at full price.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use clinic_core::calculations::WellnessCalculator;
//! use clinic_core::{
//!     MEMBER_CARD_COMPONENT, PriceEntry, PriceTable, TreatmentTable, WellnessParameters,
//!     WellnessReference,
//! };
//!
//! let reference = WellnessReference {
//!     package_prices: PriceTable::new(
//!         "package prices",
//!         vec![PriceEntry { name: "Scaling".into(), amount: dec!(100000) }],
//!     ),
//!     package_costs: PriceTable::new(
//!         "package costs",
//!         vec![
//!             PriceEntry { name: "Scaling".into(), amount: dec!(30000) },
//!             PriceEntry { name: MEMBER_CARD_COMPONENT.into(), amount: dec!(5000) },
//!         ],
//!     ),
//!     dsp: TreatmentTable::new("dental saving plan", vec![]),
//! };
//!
//! let params = WellnessParameters {
//!     total_potential_employee: 466,
//!     conversion_rate: dec!(20),
//!     discount_package: dec!(20),
//!     subscription_length_years: 1,
//!     selected_treatments: vec!["Scaling".into()],
//!     dsp_selections: vec![],
//! };
//!
//! let projection = WellnessCalculator::new(&reference).calculate(&params).unwrap();
//!
//! assert_eq!(projection.total_joining_employee, 94);
//! assert_eq!(projection.package.total_revenue, dec!(90240000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{effective_rates, unique_selections};
use crate::calculations::ProjectionError;
use crate::calculations::common::{ceil_count, fraction, validate_percentage};
use crate::calculations::fee_model::FeeModel;
use crate::calculations::pricing::{
    compute_adjusted_price, compute_demand, compute_per_item_financials,
};
use crate::{
    FinancialResult, MEMBER_CARD_COMPONENT, ProgramKind, ProgramTotals, WellnessParameters,
    WellnessReference,
};

/// Result of a corporate wellness projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessProjection {
    pub total_joining_employee: u64,
    pub subscription_months: u32,

    /// Sum of the selected monthly package prices, before discount.
    pub package_price: Decimal,
    /// Monthly package price per member after the package discount.
    pub discounted_package_price: Decimal,
    pub dentist_fee_per_member: Decimal,
    pub card_fee: Decimal,
    /// Monthly cost of one member: dentist fee, card fee and package costs.
    pub cost_per_member: Decimal,

    /// The subscription package on its own.
    pub package: ProgramTotals,
    /// Dental Saving Plan rows, in selection order.
    pub dsp_rows: Vec<FinancialResult>,
    pub dsp: ProgramTotals,
    /// Package and DSP added together.
    pub grand: ProgramTotals,
}

impl WellnessProjection {
    /// Package revenue spread over members and months. `None` when nobody
    /// joins.
    pub fn monthly_package_price_per_member(&self) -> Option<Decimal> {
        if self.total_joining_employee == 0 || self.subscription_months == 0 {
            return None;
        }
        Some(
            self.package.total_revenue
                / Decimal::from(self.subscription_months)
                / Decimal::from(self.total_joining_employee),
        )
    }
}

/// Calculator for the corporate wellness program.
#[derive(Debug, Clone)]
pub struct WellnessCalculator<'a> {
    reference: &'a WellnessReference,
    fee_model: FeeModel,
    dsp_fee_model: FeeModel,
}

impl<'a> WellnessCalculator<'a> {
    pub fn new(reference: &'a WellnessReference) -> Self {
        Self {
            reference,
            fee_model: FeeModel::for_program(ProgramKind::CorporateWellness),
            dsp_fee_model: FeeModel::dental_saving_plan(),
        }
    }

    /// Projects the package and its Dental Saving Plan add-on.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] if:
    /// - a rate is outside `[0, 100]` or the subscription is shorter than a year
    /// - a selected package or DSP treatment is missing from its table
    /// - the member card fee row is missing from the package costs
    pub fn calculate(
        &self,
        params: &WellnessParameters,
    ) -> Result<WellnessProjection, ProjectionError> {
        self.validate(params)?;

        let joining = self.total_joining_employee(params)?;
        let months = self.subscription_months(params)?;
        let selected = self.unique_package_names(&params.selected_treatments);

        let package_price = self.reference.package_prices.sum_of(selected.iter().copied())?;
        let discounted_package_price =
            compute_adjusted_price(package_price, params.discount_package)?;

        let dentist_fee_per_member = self.fee_model.shared_fee(discounted_package_price);
        let card_fee = self.card_fee()?;
        let treatment_cost = self.reference.package_costs.sum_of(selected.iter().copied())?;
        let cost_per_member = dentist_fee_per_member + card_fee + treatment_cost;

        let member_months = Decimal::from(joining) * Decimal::from(months);
        let package = ProgramTotals::new(
            discounted_package_price * member_months,
            cost_per_member * member_months,
        );

        let dsp_rows = self.dental_saving_plan(params, joining)?;
        let dsp = ProgramTotals::from_results(&dsp_rows);
        let grand = package.combine(dsp);

        debug!(
            joining,
            months,
            package_revenue = %package.total_revenue,
            dsp_revenue = %dsp.total_revenue,
            "wellness projection computed"
        );

        Ok(WellnessProjection {
            total_joining_employee: joining,
            subscription_months: months,
            package_price,
            discounted_package_price,
            dentist_fee_per_member,
            card_fee,
            cost_per_member,
            package,
            dsp_rows,
            dsp,
            grand,
        })
    }

    fn validate(
        &self,
        params: &WellnessParameters,
    ) -> Result<(), ProjectionError> {
        validate_percentage("conversion rate", params.conversion_rate)?;
        validate_percentage("discount package", params.discount_package)?;
        self.subscription_months(params)?;
        Ok(())
    }

    fn subscription_months(
        &self,
        params: &WellnessParameters,
    ) -> Result<u32, ProjectionError> {
        params
            .subscription_months()
            .filter(|&months| months > 0)
            .ok_or(ProjectionError::InvalidSubscriptionLength(
                params.subscription_length_years,
            ))
    }

    /// Joining members, rounded up before they feed the DSP layer.
    fn total_joining_employee(
        &self,
        params: &WellnessParameters,
    ) -> Result<u64, ProjectionError> {
        ceil_count(Decimal::from(params.total_potential_employee) * fraction(params.conversion_rate))
    }

    fn unique_package_names<'n>(
        &self,
        names: &'n [String],
    ) -> Vec<&'n str> {
        let mut unique: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            if !unique.contains(&name.as_str()) {
                unique.push(name.as_str());
            }
        }
        unique
    }

    fn card_fee(&self) -> Result<Decimal, ProjectionError> {
        let costs = &self.reference.package_costs;
        costs
            .find(MEMBER_CARD_COMPONENT)
            .ok_or_else(|| ProjectionError::FixedFeeNotFound {
                table: costs.label().to_string(),
                component: MEMBER_CARD_COMPONENT.to_string(),
            })
    }

    fn dental_saving_plan(
        &self,
        params: &WellnessParameters,
        joining: u64,
    ) -> Result<Vec<FinancialResult>, ProjectionError> {
        let joined = Decimal::from(joining);

        unique_selections(&params.dsp_selections)
            .into_iter()
            .map(|selection| -> Result<_, ProjectionError> {
                let record = self.reference.dsp.get(&selection.name)?;
                let rates = effective_rates(record, selection, record.discount_rate)?;
                let basis = self
                    .dsp_fee_model
                    .cost_basis(record, rates.discount_rate, false)?;
                let demand = compute_demand(joined, rates.conversion_rate)?;

                Ok(compute_per_item_financials(&record.name, &basis, demand))
            })
            .collect()
    }
}
