//! Hourly dentist hiring price list offered to client clinics.
//!
//! Tiers are keyed by the minimum cumulative hours per week the client
//! commits to, irrespective of how many dentists make up those hours.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::currency::parse_money;

const MINIMUM_HOURS_COLUMN: &str = "Hiring Minimum Hour a Week";
const FEE_COLUMN: &str = "Fee per Hour per Dentist (Rp.)";

#[derive(Debug, Error)]
pub enum PriceListError {
    #[error("price list I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("price list CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("price list row {row}: '{value}' is not a valid fee")]
    MalformedFee { row: usize, value: String },

    #[error("price list row {row}: a tier starting at {minimum_hours} hours already exists")]
    DuplicateTier { row: usize, minimum_hours: u32 },
}

/// One step of the price list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringTier {
    pub minimum_hours: u32,
    pub fee_per_hour: Decimal,
}

impl HiringTier {
    pub fn new(
        minimum_hours: u32,
        fee_per_hour: Decimal,
    ) -> Self {
        Self {
            minimum_hours,
            fee_per_hour,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TierRow {
    #[serde(rename = "Hiring Minimum Hour a Week")]
    minimum_hours: u32,
    #[serde(rename = "Fee per Hour per Dentist (Rp.)")]
    fee_per_hour: String,
}

/// Tiers ordered by ascending minimum hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringPriceList {
    tiers: Vec<HiringTier>,
}

impl Default for HiringPriceList {
    fn default() -> Self {
        Self {
            tiers: vec![
                HiringTier::new(0, Decimal::from(150_000)),
                HiringTier::new(10, Decimal::from(140_000)),
                HiringTier::new(30, Decimal::from(120_000)),
                HiringTier::new(50, Decimal::from(110_000)),
            ],
        }
    }
}

impl HiringPriceList {
    /// Builds a list from tiers in any order.
    ///
    /// # Errors
    ///
    /// [`PriceListError::DuplicateTier`] when two tiers share a minimum.
    pub fn new(mut tiers: Vec<HiringTier>) -> Result<Self, PriceListError> {
        tiers.sort_by_key(|t| t.minimum_hours);
        if let Some(pos) = tiers
            .windows(2)
            .position(|w| w[0].minimum_hours == w[1].minimum_hours)
        {
            return Err(PriceListError::DuplicateTier {
                row: pos + 2,
                minimum_hours: tiers[pos].minimum_hours,
            });
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[HiringTier] {
        &self.tiers
    }

    /// The tier that applies to `hours_per_week`: the one with the highest
    /// minimum not above it. `None` when every tier starts above it.
    pub fn tier_for(
        &self,
        hours_per_week: u32,
    ) -> Option<&HiringTier> {
        self.tiers
            .iter()
            .rev()
            .find(|t| t.minimum_hours <= hours_per_week)
    }

    pub fn fee_for(
        &self,
        hours_per_week: u32,
    ) -> Option<Decimal> {
        self.tier_for(hours_per_week).map(|t| t.fee_per_hour)
    }

    /// Weekly charge for `hours_per_week` cumulative dentist hours.
    pub fn weekly_quote(
        &self,
        hours_per_week: u32,
    ) -> Option<Decimal> {
        self.fee_for(hours_per_week)
            .map(|fee| fee * Decimal::from(hours_per_week))
    }

    /// Reads a price list CSV.
    pub fn parse<R: Read>(reader: R) -> Result<Self, PriceListError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut tiers = Vec::new();
        let mut seen = std::collections::HashMap::new();
        for (idx, result) in csv_reader.deserialize::<TierRow>().enumerate() {
            let row = idx + 1;
            let record = result?;
            let fee_per_hour =
                parse_money(&record.fee_per_hour).map_err(|_| PriceListError::MalformedFee {
                    row,
                    value: record.fee_per_hour.clone(),
                })?;
            if seen.insert(record.minimum_hours, row).is_some() {
                return Err(PriceListError::DuplicateTier {
                    row,
                    minimum_hours: record.minimum_hours,
                });
            }
            tiers.push(HiringTier::new(record.minimum_hours, fee_per_hour));
        }

        Self::new(tiers)
    }

    pub fn load(path: &Path) -> Result<Self, PriceListError> {
        let list = Self::parse(fs::File::open(path)?)?;
        debug!(path = %path.display(), tiers = list.tiers.len(), "Loaded hiring price list");
        Ok(list)
    }

    /// Writes the list as CSV; fees are written as plain numbers.
    pub fn write<W: Write>(
        &self,
        writer: W,
    ) -> Result<(), PriceListError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([MINIMUM_HOURS_COLUMN, FEE_COLUMN])?;
        for tier in &self.tiers {
            csv_writer.write_record([
                tier.minimum_hours.to_string(),
                tier.fee_per_hour.normalize().to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Publishes the list to `path`, replacing any previous version.
    pub fn save(
        &self,
        path: &Path,
    ) -> Result<(), PriceListError> {
        self.write(fs::File::create(path)?)?;
        info!(path = %path.display(), tiers = self.tiers.len(), "Hiring price list updated");
        Ok(())
    }
}
