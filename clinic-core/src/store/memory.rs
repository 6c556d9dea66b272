use std::cell::RefCell;

use super::repository::{RepositoryError, ScenarioRepository};
use crate::models::ScenarioSnapshot;

/// A repository that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryScenarioRepository {
    snapshots: RefCell<Vec<ScenarioSnapshot>>,
}

impl MemoryScenarioRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with existing snapshots, as if reloaded.
    pub fn with_snapshots(snapshots: Vec<ScenarioSnapshot>) -> Self {
        Self {
            snapshots: RefCell::new(snapshots),
        }
    }
}

impl ScenarioRepository for MemoryScenarioRepository {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<Vec<ScenarioSnapshot>, RepositoryError> {
        Ok(self.snapshots.borrow().clone())
    }

    fn store_all(
        &self,
        snapshots: &[ScenarioSnapshot],
    ) -> Result<(), RepositoryError> {
        *self.snapshots.borrow_mut() = snapshots.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        self.snapshots.borrow_mut().clear();
        Ok(())
    }
}
