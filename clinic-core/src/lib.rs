pub mod calculations;
pub mod ledger;
pub mod models;
pub mod store;

pub use calculations::ProjectionError;
pub use ledger::{LedgerError, PersistenceStatus, SaveReceipt, ScenarioLedger};
pub use models::*;
pub use store::{RepositoryError, ScenarioRepository};
