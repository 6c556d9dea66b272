//! The Reference Data Store: file layout of a data directory plus caching.
//!
//! ```text
//! data/
//!   treatment_prices.csv          package prices (wellness)
//!   treatment_costs.csv           package costs + member card row (wellness)
//!   dsp.csv                       Dental Saving Plan (wellness)
//!   school_treatments.csv         outreach treatments, one file per program
//!   school_event_cost.csv         outreach event costs, one file per program
//!   corporate_cashflow.csv        monthly cashflow, one file per program
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clinic_core::{CashflowSeries, OutreachReference, ProgramKind, WellnessReference};
use tracing::{debug, info};

use crate::cache::TableCache;
use crate::loader::{
    ReferenceLoadError, open_table, parse_cashflow, parse_dsp, parse_event_costs,
    parse_outreach_treatments, parse_package_costs, parse_package_prices,
};

pub const PACKAGE_PRICES_FILE: &str = "treatment_prices.csv";
pub const PACKAGE_COSTS_FILE: &str = "treatment_costs.csv";
pub const DSP_FILE: &str = "dsp.csv";

/// File-name stem used for a program's per-program tables.
pub fn file_stem(kind: ProgramKind) -> &'static str {
    match kind {
        ProgramKind::CorporateWellness => "corporate",
        ProgramKind::SchoolOutreach => "school",
        ProgramKind::AgeCareOutreach => "agecare",
        ProgramKind::SpecialNeedsOutreach => "special_needs",
    }
}

/// Loads reference tables from a data directory, memoizing each by path.
#[derive(Debug)]
pub struct ReferenceStore {
    data_dir: PathBuf,
    wellness: TableCache<WellnessReference>,
    outreach: TableCache<OutreachReference>,
    cashflow: TableCache<CashflowSeries>,
}

impl ReferenceStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        debug!(data_dir = %data_dir.display(), "Opening reference store");
        Self {
            data_dir,
            wellness: TableCache::new(),
            outreach: TableCache::new(),
            cashflow: TableCache::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn outreach_treatments_path(
        &self,
        kind: ProgramKind,
    ) -> PathBuf {
        self.data_dir
            .join(format!("{}_treatments.csv", file_stem(kind)))
    }

    pub fn event_cost_path(
        &self,
        kind: ProgramKind,
    ) -> PathBuf {
        self.data_dir
            .join(format!("{}_event_cost.csv", file_stem(kind)))
    }

    pub fn cashflow_path(
        &self,
        kind: ProgramKind,
    ) -> PathBuf {
        self.data_dir
            .join(format!("{}_cashflow.csv", file_stem(kind)))
    }

    /// Package prices, package costs and the DSP table.
    pub fn wellness(&self) -> Result<Arc<WellnessReference>, ReferenceLoadError> {
        let key = self.data_dir.join(PACKAGE_PRICES_FILE);
        self.wellness
            .get_or_load(&key, |prices_path| self.read_wellness(prices_path))
    }

    /// Treatment and event-cost tables of an outreach program.
    pub fn outreach(
        &self,
        kind: ProgramKind,
    ) -> Result<Arc<OutreachReference>, ReferenceLoadError> {
        let key = self.outreach_treatments_path(kind);
        self.outreach
            .get_or_load(&key, |treatments_path| self.read_outreach(kind, treatments_path))
    }

    fn read_wellness(
        &self,
        prices_path: &Path,
    ) -> Result<WellnessReference, ReferenceLoadError> {
        let costs_path = self.data_dir.join(PACKAGE_COSTS_FILE);
        let dsp_path = self.data_dir.join(DSP_FILE);

        let reference = WellnessReference {
            package_prices: parse_package_prices(
                open_table(prices_path, "package prices")?,
                "package prices",
            )?,
            package_costs: parse_package_costs(
                open_table(&costs_path, "package costs")?,
                "package costs",
            )?,
            dsp: parse_dsp(
                open_table(&dsp_path, "dental saving plan")?,
                "dental saving plan",
            )?,
        };
        info!(data_dir = %self.data_dir.display(), "Loaded wellness reference tables");
        Ok(reference)
    }

    fn read_outreach(
        &self,
        kind: ProgramKind,
        treatments_path: &Path,
    ) -> Result<OutreachReference, ReferenceLoadError> {
        let treatments_table = format!("{} treatments", kind.as_str());
        let events_table = format!("{} event cost", kind.as_str());

        let reference = OutreachReference {
            treatments: parse_outreach_treatments(
                open_table(treatments_path, &treatments_table)?,
                &treatments_table,
            )?,
            event_costs: parse_event_costs(
                open_table(&self.event_cost_path(kind), &events_table)?,
                &events_table,
            )?,
        };
        info!(program = %kind, "Loaded outreach reference tables");
        Ok(reference)
    }

    /// The monthly cashflow at `path`, labelled `program`.
    pub fn cashflow(
        &self,
        path: &Path,
        program: &str,
    ) -> Result<Arc<CashflowSeries>, ReferenceLoadError> {
        self.cashflow
            .get_or_load(path, |path| parse_cashflow(open_table(path, program)?, program))
    }

    /// The cashflow file a program keeps in the data directory.
    pub fn program_cashflow(
        &self,
        kind: ProgramKind,
    ) -> Result<Arc<CashflowSeries>, ReferenceLoadError> {
        self.cashflow(&self.cashflow_path(kind), kind.label())
    }

    /// Forgets every cached table so the next access rereads the files.
    pub fn reload(&self) {
        self.wellness.clear();
        self.outreach.clear();
        self.cashflow.clear();
        debug!("Reference store caches cleared");
    }

    /// Forgets the cached table keyed by `path`: the package price file for
    /// the wellness tables, the treatments file for an outreach program, or
    /// the cashflow file itself.
    pub fn invalidate(
        &self,
        path: &Path,
    ) -> bool {
        let wellness = self.wellness.invalidate(path);
        let outreach = self.outreach.invalidate(path);
        let cashflow = self.cashflow.invalidate(path);
        wellness || outreach || cashflow
    }
}
