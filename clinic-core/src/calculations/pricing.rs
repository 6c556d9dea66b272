//! Per-treatment pricing: demand, discounted price and item financials.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use clinic_core::calculations::{
//!     CostBasis, compute_adjusted_price, compute_demand, compute_per_item_financials,
//! };
//!
//! // 100 people, 20% join, half of those take the treatment.
//! let joined = dec!(100) * dec!(0.20);
//! let demand = compute_demand(joined, dec!(50)).unwrap();
//! assert_eq!(demand, 10);
//!
//! let basis = CostBasis {
//!     adjusted_price: compute_adjusted_price(dec!(200000), dec!(10)).unwrap(),
//!     cost_material: dec!(50000),
//!     dentist_fee: dec!(20000),
//!     sedation_cost: dec!(0),
//! };
//! let result = compute_per_item_financials("Scaling", &basis, demand);
//!
//! assert_eq!(result.revenue, dec!(1800000));
//! assert_eq!(result.cost, dec!(700000));
//! assert_eq!(result.profit, dec!(1100000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProjectionError;
use super::common::{ceil_count, fraction, validate_non_negative, validate_percentage};
use crate::FinancialResult;

/// Number of takers out of `total_joined` at `conversion_rate` percent.
///
/// Uses ceiling rounding so any positive rate over a positive population
/// yields at least one taker.
///
/// # Errors
///
/// Returns [`ProjectionError`] if `total_joined` is negative or
/// `conversion_rate` is outside `[0, 100]`.
pub fn compute_demand(
    total_joined: Decimal,
    conversion_rate: Decimal,
) -> Result<u64, ProjectionError> {
    validate_non_negative("joined population", total_joined)?;
    validate_percentage("conversion rate", conversion_rate)?;

    ceil_count(total_joined * fraction(conversion_rate))
}

/// Price after a multiplicative discount. Always computed from the original
/// price, so re-applying it never compounds.
///
/// # Errors
///
/// Returns [`ProjectionError`] if `original_price` is negative or
/// `discount_rate` is outside `[0, 100]`.
pub fn compute_adjusted_price(
    original_price: Decimal,
    discount_rate: Decimal,
) -> Result<Decimal, ProjectionError> {
    validate_non_negative("price", original_price)?;
    validate_percentage("discount rate", discount_rate)?;

    Ok(original_price * (Decimal::ONE - fraction(discount_rate)))
}

/// Unit price and unit cost components of one treatment, as resolved by a
/// [`super::FeeModel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBasis {
    pub adjusted_price: Decimal,
    pub cost_material: Decimal,
    pub dentist_fee: Decimal,
    /// Zero for every program except special-needs outreach.
    pub sedation_cost: Decimal,
}

impl CostBasis {
    pub fn unit_cost(&self) -> Decimal {
        self.cost_material + self.dentist_fee + self.sedation_cost
    }
}

/// Revenue, cost and profit of `demand` units of one treatment.
pub fn compute_per_item_financials(
    treatment: &str,
    basis: &CostBasis,
    demand: u64,
) -> FinancialResult {
    let units = Decimal::from(demand);
    let revenue = basis.adjusted_price * units;
    let cost = basis.unit_cost() * units;

    FinancialResult {
        treatment: treatment.to_string(),
        joining_count: demand,
        adjusted_price: basis.adjusted_price,
        revenue,
        cost,
        profit: revenue - cost,
    }
}
