//! School, age-care and special-needs outreach projections.
//!
//! Outreach programs are single-campaign projections. The joined population
//! is kept fractional; each treatment then rounds its own demand up:
//!
//! ```text
//! joined       = population × conversion%
//! demand(t)    = ceil(joined × conversion%(t))
//! revenue(t)   = price(t) × (1 − discount%) × demand(t)
//! cost(t)      = (material + dentist fee [+ sedation]) × demand(t)
//! total cost   = Σ cost(t) + event cost × event frequency
//! ```
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use clinic_core::calculations::OutreachCalculator;
//! use clinic_core::{
//!     OutreachParameters, OutreachReference, PopulationSegment, ProgramKind, TreatmentRecord,
//!     TreatmentSelection, TreatmentTable,
//! };
//!
//! let reference = OutreachReference {
//!     treatments: TreatmentTable::new(
//!         "school treatments",
//!         vec![TreatmentRecord {
//!             name: "Fluoride".into(),
//!             original_price: dec!(100000),
//!             cost_material: dec!(20000),
//!             dentist_fee: None,
//!             conversion_rate: dec!(50),
//!             discount_rate: dec!(0),
//!             sedation_cost: None,
//!         }],
//!     ),
//!     event_costs: vec![],
//! };
//!
//! let params = OutreachParameters {
//!     program: ProgramKind::SchoolOutreach,
//!     segments: vec![PopulationSegment::new("students", 100)],
//!     conversion_rate: dec!(20),
//!     discount_rate: dec!(0),
//!     event_frequency: 1,
//!     selections: vec![TreatmentSelection::named("Fluoride")],
//! };
//!
//! let projection = OutreachCalculator::new(&reference).calculate(&params).unwrap();
//!
//! assert_eq!(projection.total_joined, dec!(20));
//! assert_eq!(projection.rows[0].joining_count, 10);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{effective_rates, unique_selections};
use crate::calculations::ProjectionError;
use crate::calculations::common::{fraction, validate_non_negative, validate_percentage};
use crate::calculations::fee_model::FeeModel;
use crate::calculations::pricing::{compute_demand, compute_per_item_financials};
use crate::{FinancialResult, OutreachParameters, OutreachReference, ProgramKind, ProgramTotals};

/// Result of an outreach projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachProjection {
    pub program: ProgramKind,
    pub total_population: u64,
    /// Population × conversion rate, not rounded.
    pub total_joined: Decimal,
    /// One row per selected treatment, in selection order.
    pub rows: Vec<FinancialResult>,
    pub event_cost_per_event: Decimal,
    pub event_frequency: u32,
    pub totals: ProgramTotals,
}

impl OutreachProjection {
    pub fn total_event_cost(&self) -> Decimal {
        self.event_cost_per_event * Decimal::from(self.event_frequency)
    }
}

/// Calculator shared by the three outreach programs.
#[derive(Debug, Clone)]
pub struct OutreachCalculator<'a> {
    reference: &'a OutreachReference,
}

impl<'a> OutreachCalculator<'a> {
    pub fn new(reference: &'a OutreachReference) -> Self {
        Self { reference }
    }

    /// Projects revenue, cost and profit of one outreach campaign.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] if:
    /// - `params.program` is not an outreach program
    /// - a rate is outside `[0, 100]` or an event cost is negative
    /// - a selected treatment is missing from the treatment table
    pub fn calculate(
        &self,
        params: &OutreachParameters,
    ) -> Result<OutreachProjection, ProjectionError> {
        let rows = self.preview(params)?;
        let total_population = self.total_population(params)?;
        let event_cost_per_event = self.event_cost_per_event()?;
        let event_frequency = Decimal::from(params.event_frequency);

        let totals = ProgramTotals::from_results(&rows)
            .with_fixed_cost(event_cost_per_event * event_frequency);

        debug!(
            program = params.program.as_str(),
            treatments = rows.len(),
            revenue = %totals.total_revenue,
            cost = %totals.total_cost,
            "outreach projection computed"
        );

        Ok(OutreachProjection {
            program: params.program,
            total_population,
            total_joined: self.total_joined(total_population, params.conversion_rate),
            rows,
            event_cost_per_event,
            event_frequency: params.event_frequency,
            totals,
        })
    }

    /// Adjusted price, demand and item financials for each selection, without
    /// event costs.
    pub fn preview(
        &self,
        params: &OutreachParameters,
    ) -> Result<Vec<FinancialResult>, ProjectionError> {
        self.validate(params)?;

        let fee_model = FeeModel::for_program(params.program);
        let include_sedation = params.program.includes_sedation();
        let joined = self.total_joined(self.total_population(params)?, params.conversion_rate);

        unique_selections(&params.selections)
            .into_iter()
            .map(|selection| -> Result<_, ProjectionError> {
                let record = self.reference.treatments.get(&selection.name)?;
                let rates = effective_rates(record, selection, params.discount_rate)?;
                let basis = fee_model.cost_basis(record, rates.discount_rate, include_sedation)?;
                let demand = compute_demand(joined, rates.conversion_rate)?;

                Ok(compute_per_item_financials(&record.name, &basis, demand))
            })
            .collect()
    }

    fn validate(
        &self,
        params: &OutreachParameters,
    ) -> Result<(), ProjectionError> {
        if !params.program.is_outreach() {
            return Err(ProjectionError::NotAnOutreachProgram(params.program));
        }
        validate_percentage("conversion rate", params.conversion_rate)?;
        validate_percentage("discount rate", params.discount_rate)?;
        Ok(())
    }

    fn total_population(
        &self,
        params: &OutreachParameters,
    ) -> Result<u64, ProjectionError> {
        params
            .total_population()
            .ok_or(ProjectionError::PopulationOverflow)
    }

    fn total_joined(
        &self,
        population: u64,
        conversion_rate: Decimal,
    ) -> Decimal {
        Decimal::from(population) * fraction(conversion_rate)
    }

    fn event_cost_per_event(&self) -> Result<Decimal, ProjectionError> {
        self.reference
            .event_costs
            .iter()
            .map(|item| -> Result<_, ProjectionError> {
                validate_non_negative(
                    &format!("unit quantity of '{}'", item.component),
                    item.unit_quantity,
                )?;
                validate_non_negative(
                    &format!("cost per unit of '{}'", item.component),
                    item.cost_per_unit,
                )?;
                Ok(item.total())
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{EventCostItem, PopulationSegment, TreatmentRecord, TreatmentSelection, TreatmentTable};

    fn treatment(
        name: &str,
        price: Decimal,
        material: Decimal,
        conversion: Decimal,
    ) -> TreatmentRecord {
        TreatmentRecord {
            name: name.to_string(),
            original_price: price,
            cost_material: material,
            dentist_fee: None,
            conversion_rate: conversion,
            discount_rate: dec!(0),
            sedation_cost: None,
        }
    }

    fn test_reference() -> OutreachReference {
        let mut extraction = treatment("Extraction", dec!(400000), dec!(50000), dec!(10));
        extraction.dentist_fee = Some(dec!(100000));
        extraction.sedation_cost = Some(dec!(200000));

        OutreachReference {
            treatments: TreatmentTable::new(
                "outreach treatments",
                vec![
                    treatment("Scaling", dec!(200000), dec!(30000), dec!(50)),
                    extraction,
                ],
            ),
            event_costs: vec![
                EventCostItem {
                    component: "Venue".to_string(),
                    unit_quantity: dec!(1),
                    cost_per_unit: dec!(500000),
                },
                EventCostItem {
                    component: "Goodie bag".to_string(),
                    unit_quantity: dec!(20),
                    cost_per_unit: dec!(15000),
                },
            ],
        }
    }

    fn test_params(program: ProgramKind) -> OutreachParameters {
        OutreachParameters {
            program,
            segments: vec![PopulationSegment::new("students", 100)],
            conversion_rate: dec!(20),
            discount_rate: dec!(10),
            event_frequency: 4,
            selections: vec![
                TreatmentSelection::named("Scaling"),
                TreatmentSelection::named("Extraction"),
            ],
        }
    }

    #[test]
    fn joined_population_is_not_rounded() {
        let reference = test_reference();
        let mut params = test_params(ProgramKind::SchoolOutreach);
        params.segments = vec![PopulationSegment::new("residents", 3)];
        params.conversion_rate = dec!(10);

        let projection = OutreachCalculator::new(&reference)
            .calculate(&params)
            .unwrap();

        assert_eq!(projection.total_joined, dec!(0.3));
        // each treatment rounds its own demand: ceil(0.3 × 50%), ceil(0.3 × 10%)
        assert_eq!(projection.rows[0].joining_count, 1);
        assert_eq!(projection.rows[1].joining_count, 1);
    }

    #[test]
    fn segments_are_summed() {
        let reference = test_reference();
        let mut params = test_params(ProgramKind::SchoolOutreach);
        params.segments = vec![
            PopulationSegment::new("students", 1000),
            PopulationSegment::new("teachers & parents", 500),
        ];

        let projection = OutreachCalculator::new(&reference)
            .calculate(&params)
            .unwrap();

        assert_eq!(projection.total_population, 1500);
        assert_eq!(projection.total_joined, dec!(300));
    }

    #[test]
    fn school_projection_totals() {
        let reference = test_reference();
        let projection = OutreachCalculator::new(&reference)
            .calculate(&test_params(ProgramKind::SchoolOutreach))
            .unwrap();

        // joined 20; scaling ceil(20 × 50%) = 10, extraction ceil(20 × 10%) = 2
        let scaling = &projection.rows[0];
        assert_eq!(scaling.joining_count, 10);
        assert_eq!(scaling.adjusted_price, dec!(180000));
        assert_eq!(scaling.revenue, dec!(1800000));
        // (30,000 + 20,000 derived fee) × 10
        assert_eq!(scaling.cost, dec!(500000));

        let extraction = &projection.rows[1];
        assert_eq!(extraction.joining_count, 2);
        assert_eq!(extraction.revenue, dec!(720000));
        // stored fee, no sedation outside the special-needs program
        assert_eq!(extraction.cost, dec!(300000));

        // 500,000 + 20 × 15,000 per event
        assert_eq!(projection.event_cost_per_event, dec!(800000));
        assert_eq!(projection.total_event_cost(), dec!(3200000));
        assert_eq!(
            projection.totals,
            ProgramTotals::new(dec!(2520000), dec!(4000000))
        );
        assert_eq!(projection.totals.total_profit, dec!(-1480000));
    }

    #[test]
    fn special_needs_adds_sedation_cost() {
        let reference = test_reference();
        let projection = OutreachCalculator::new(&reference)
            .calculate(&test_params(ProgramKind::SpecialNeedsOutreach))
            .unwrap();

        // (50,000 + 100,000 + 200,000) × 2
        assert_eq!(projection.rows[1].cost, dec!(700000));
    }

    #[test]
    fn selection_overrides_program_discount_and_conversion() {
        let reference = test_reference();
        let mut params = test_params(ProgramKind::AgeCareOutreach);
        params.selections = vec![
            TreatmentSelection::named("Scaling")
                .with_discount_rate(dec!(0))
                .with_conversion_rate(dec!(100)),
        ];

        let rows = OutreachCalculator::new(&reference).preview(&params).unwrap();

        assert_eq!(rows[0].adjusted_price, dec!(200000));
        assert_eq!(rows[0].joining_count, 20);
    }

    #[test]
    fn zero_event_frequency_has_no_event_cost() {
        let reference = test_reference();
        let mut params = test_params(ProgramKind::SchoolOutreach);
        params.event_frequency = 0;

        let projection = OutreachCalculator::new(&reference)
            .calculate(&params)
            .unwrap();

        assert_eq!(projection.totals, ProgramTotals::new(dec!(2520000), dec!(800000)));
    }

    #[test]
    fn wellness_is_not_an_outreach_program() {
        let reference = test_reference();
        let result = OutreachCalculator::new(&reference)
            .calculate(&test_params(ProgramKind::CorporateWellness));

        assert_eq!(
            result,
            Err(ProjectionError::NotAnOutreachProgram(ProgramKind::CorporateWellness))
        );
    }

    #[test]
    fn unknown_treatment_is_not_found() {
        let reference = test_reference();
        let mut params = test_params(ProgramKind::SchoolOutreach);
        params.selections.push(TreatmentSelection::named("Implant"));

        let result = OutreachCalculator::new(&reference).calculate(&params);

        assert_eq!(
            result,
            Err(ProjectionError::TreatmentNotFound {
                table: "outreach treatments".to_string(),
                name: "Implant".to_string(),
            })
        );
    }

    #[test]
    fn negative_event_cost_is_rejected() {
        let mut reference = test_reference();
        reference.event_costs[0].cost_per_unit = dec!(-1);

        let result =
            OutreachCalculator::new(&reference).calculate(&test_params(ProgramKind::SchoolOutreach));

        assert_eq!(
            result,
            Err(ProjectionError::NegativeValue {
                field: "cost per unit of 'Venue'".to_string(),
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn conversion_rate_above_hundred_is_rejected() {
        let reference = test_reference();
        let mut params = test_params(ProgramKind::SchoolOutreach);
        params.conversion_rate = dec!(120);

        assert!(OutreachCalculator::new(&reference).calculate(&params).is_err());
    }

    #[test]
    fn population_too_large_to_count_is_rejected() {
        let reference = test_reference();
        let mut params = test_params(ProgramKind::SchoolOutreach);
        params.segments = vec![
            PopulationSegment::new("students", u64::MAX),
            PopulationSegment::new("staff", 1),
        ];

        let calculator = OutreachCalculator::new(&reference);

        assert_eq!(
            calculator.calculate(&params),
            Err(ProjectionError::PopulationOverflow)
        );
        assert_eq!(
            calculator.preview(&params),
            Err(ProjectionError::PopulationOverflow)
        );
    }
}
