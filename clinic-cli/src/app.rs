//! Wires configuration, the reference store, the engine and the ledger.

use std::sync::Arc;

use anyhow::{Context, Result};
use clinic_core::calculations::{
    CashflowBoard, OutreachCalculator, OutreachProjection, WellnessCalculator, WellnessProjection,
};
use clinic_core::store::RepositoryRegistry;
use clinic_core::{
    FinancialResult, OutreachParameters, ProgramKind, ScenarioLedger, TreatmentSelection,
    WellnessParameters,
};
use clinic_data::{HiringPriceList, ReferenceStore, default_registry};
use tracing::{debug, warn};

use crate::config::Config;

pub struct App {
    config: Config,
    store: ReferenceStore,
    registry: RepositoryRegistry,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = ReferenceStore::new(&config.data.dir);
        Self {
            config,
            store,
            registry: default_registry(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fills in every package treatment when none is selected.
    pub fn wellness(
        &self,
        mut params: WellnessParameters,
    ) -> Result<WellnessProjection> {
        let reference = self
            .store
            .wellness()
            .context("failed to load wellness reference tables")?;
        if params.selected_treatments.is_empty() {
            params.selected_treatments = reference
                .package_prices
                .names()
                .map(str::to_string)
                .collect();
            debug!(count = params.selected_treatments.len(), "Selecting every package treatment");
        }

        WellnessCalculator::new(&reference)
            .calculate(&params)
            .context("wellness projection failed")
    }

    /// Fills in every treatment of the program's table when none is selected.
    pub fn outreach(
        &self,
        params: OutreachParameters,
    ) -> Result<OutreachProjection> {
        let (reference, params) = self.outreach_inputs(params)?;
        OutreachCalculator::new(&reference)
            .calculate(&params)
            .with_context(|| format!("{} projection failed", params.program.label()))
    }

    pub fn preview(
        &self,
        params: OutreachParameters,
    ) -> Result<Vec<FinancialResult>> {
        let (reference, params) = self.outreach_inputs(params)?;
        OutreachCalculator::new(&reference)
            .preview(&params)
            .with_context(|| format!("{} preview failed", params.program.label()))
    }

    fn outreach_inputs(
        &self,
        mut params: OutreachParameters,
    ) -> Result<(Arc<clinic_core::OutreachReference>, OutreachParameters)> {
        let reference = self
            .store
            .outreach(params.program)
            .with_context(|| format!("failed to load {} reference tables", params.program.label()))?;
        if params.selections.is_empty() {
            params.selections = reference
                .treatments
                .names()
                .map(TreatmentSelection::named)
                .collect();
        }
        Ok((reference, params))
    }

    /// A board holding the cashflow of each program in `programs`.
    pub fn cashflow(
        &self,
        programs: &[ProgramKind],
    ) -> Result<CashflowBoard> {
        let mut board = CashflowBoard::new();
        for kind in programs {
            let series = self
                .store
                .program_cashflow(*kind)
                .with_context(|| format!("failed to load {} cashflow", kind.label()))?;
            board.add((*series).clone());
        }
        Ok(board)
    }

    /// Opens this session's scenario ledger on the configured backend.
    pub fn open_ledger(&self) -> Result<ScenarioLedger> {
        let repository = self
            .registry
            .create(&self.config.store_config())
            .context("failed to open scenario ledger")?;
        let ledger = ScenarioLedger::open(repository);
        if let Some(reason) = ledger.load_warning() {
            warn!(%reason, "Starting with an empty scenario ledger");
        }
        Ok(ledger)
    }

    /// The published price list, or the standard tiers if none was saved.
    pub fn price_list(&self) -> Result<HiringPriceList> {
        let path = &self.config.data.price_list;
        if !path.exists() {
            return Ok(HiringPriceList::default());
        }
        HiringPriceList::load(path)
            .with_context(|| format!("failed to load price list: {}", path.display()))
    }

    pub fn publish_price_list(
        &self,
        list: &HiringPriceList,
    ) -> Result<()> {
        let path = &self.config.data.price_list;
        list.save(path)
            .with_context(|| format!("failed to save price list: {}", path.display()))
    }
}
