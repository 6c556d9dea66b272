//! Reference Data Store for the clinic projections.
//!
//! Loads the CSV reference tables the engine consumes, caches them per path,
//! and provides the file-backed scenario ledger and the hiring price list.

pub mod cache;
pub mod currency;
pub mod ledger_csv;
pub mod loader;
pub mod store;
pub mod talent;

pub use cache::TableCache;
pub use currency::{CurrencyError, format_rupiah, parse_money, parse_percent, parse_rupiah};
pub use ledger_csv::{CsvRepositoryFactory, CsvScenarioRepository};
pub use loader::ReferenceLoadError;
pub use store::ReferenceStore;
pub use talent::{HiringPriceList, HiringTier, PriceListError};

use clinic_core::store::RepositoryRegistry;

/// A registry with every backend this workspace ships: `memory` and `csv`.
pub fn default_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::with_memory_backend();
    registry.register(Box::new(CsvRepositoryFactory));
    registry
}
