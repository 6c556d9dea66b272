use thiserror::Error;

use crate::models::ScenarioSnapshot;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt scenario data: {0}")]
    Corrupt(String),

    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

/// Backing store of the scenario ledger.
///
/// The ledger always writes the full set of snapshots; backends do not need
/// to support partial updates.
pub trait ScenarioRepository {
    /// Human-readable location, for log messages.
    fn describe(&self) -> String;

    /// Every stored snapshot. An absent store is an empty ledger.
    fn load(&self) -> Result<Vec<ScenarioSnapshot>, RepositoryError>;

    /// Replaces the stored snapshots with `snapshots`.
    fn store_all(
        &self,
        snapshots: &[ScenarioSnapshot],
    ) -> Result<(), RepositoryError>;

    /// Removes every stored snapshot and any backing state.
    fn clear(&self) -> Result<(), RepositoryError>;
}
