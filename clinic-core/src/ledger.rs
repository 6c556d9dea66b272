//! Scenario ledger: an append-only list of saved projections for side-by-side
//! comparison.
//!
//! Each session owns its own [`ScenarioLedger`]. The only mutations are
//! [`ScenarioLedger::save`] (append) and [`ScenarioLedger::reset`] (clear).
//! Persistence is best effort: a failed write is reported and logged but the
//! in-memory ledger, and whatever result was just computed, stay valid. A
//! store that could not be read when the ledger opened is never written by
//! `save`, so the scenarios it holds are not overwritten; only an explicit
//! `reset` clears it.

use std::cmp::Reverse;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{ScenarioComparison, ScenarioMetrics, ScenarioSnapshot};
use crate::store::{RepositoryError, ScenarioRepository};

/// Outcome of writing the ledger to its backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceStatus {
    /// The backing store holds the current ledger.
    Persisted,
    /// The ledger has no backing store.
    Detached,
    /// The write failed; the in-memory ledger is still current.
    Failed(String),
}

impl PersistenceStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The highest id already in use is `u32::MAX`.
    #[error("no scenario id left after {0}")]
    IdsExhausted(u32),
}

/// A saved snapshot together with how its persistence went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub snapshot: ScenarioSnapshot,
    pub persistence: PersistenceStatus,
}

pub struct ScenarioLedger {
    snapshots: Vec<ScenarioSnapshot>,
    repository: Option<Box<dyn ScenarioRepository>>,
    load_warning: Option<String>,
}

impl ScenarioLedger {
    /// A ledger with no backing store.
    pub fn in_memory() -> Self {
        Self {
            snapshots: Vec::new(),
            repository: None,
            load_warning: None,
        }
    }

    /// Opens a ledger over `repository`, loading what it already holds.
    ///
    /// An unreadable store degrades to an empty ledger; the reason is kept
    /// in [`ScenarioLedger::load_warning`].
    pub fn open(repository: Box<dyn ScenarioRepository>) -> Self {
        let (mut snapshots, load_warning) = match repository.load() {
            Ok(snapshots) => (snapshots, None),
            Err(error) => {
                warn!(
                    store = %repository.describe(),
                    %error,
                    "scenario ledger unreadable, starting empty"
                );
                (Vec::new(), Some(error.to_string()))
            }
        };
        snapshots.sort_by_key(|s| s.id);
        debug!(count = snapshots.len(), "scenario ledger opened");

        Self {
            snapshots,
            repository: Some(repository),
            load_warning,
        }
    }

    /// Why the backing store could not be read, if it could not.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    pub fn snapshots(&self) -> &[ScenarioSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The id the next saved scenario will receive, or `None` once every
    /// `u32` id is taken.
    pub fn next_id(&self) -> Option<u32> {
        match self.snapshots.iter().map(|s| s.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        }
    }

    /// Appends a snapshot of `metrics` and persists the ledger.
    ///
    /// Returns [`LedgerError::IdsExhausted`] when no id is left; the ledger is
    /// unchanged in that case.
    pub fn save(
        &mut self,
        metrics: impl Into<ScenarioMetrics>,
    ) -> Result<SaveReceipt, LedgerError> {
        let id = self.next_id().ok_or(LedgerError::IdsExhausted(u32::MAX))?;
        let snapshot = ScenarioSnapshot::new(id, metrics.into());
        self.snapshots.push(snapshot);
        debug!(id = snapshot.id, "scenario saved");

        let persistence = match &self.load_warning {
            Some(reason) => self.refuse_write(reason),
            None => self.persist(|repo, snapshots| repo.store_all(snapshots)),
        };
        Ok(SaveReceipt {
            snapshot,
            persistence,
        })
    }

    /// Removes every snapshot, in memory and in the backing store. Ids
    /// restart at 1.
    ///
    /// Clearing a store that was unreadable at open makes it writable again.
    pub fn reset(&mut self) -> PersistenceStatus {
        self.snapshots.clear();
        debug!("scenario ledger reset");

        let status = self.persist(|repo, _| repo.clear());
        if status == PersistenceStatus::Persisted {
            self.load_warning = None;
        }
        status
    }

    /// Every scenario in id order, with profit derived from revenue and
    /// expense.
    pub fn compare(&self) -> Vec<ScenarioComparison> {
        self.snapshots.iter().map(ScenarioComparison::from).collect()
    }

    /// Scenarios from most to least profitable; ties keep id order.
    pub fn ranked_by_profit(&self) -> Vec<ScenarioComparison> {
        let mut rows = self.compare();
        rows.sort_by_key(|row| (Reverse(row.profit), row.id));
        rows
    }

    fn refuse_write(
        &self,
        reason: &str,
    ) -> PersistenceStatus {
        let store = self
            .repository
            .as_ref()
            .map(|r| r.describe())
            .unwrap_or_default();
        warn!(%store, %reason, "scenario ledger not persisted, store was unreadable at open");
        PersistenceStatus::Failed(format!("ledger store was unreadable at open: {reason}"))
    }

    fn persist(
        &self,
        write: impl FnOnce(&dyn ScenarioRepository, &[ScenarioSnapshot]) -> Result<(), RepositoryError>,
    ) -> PersistenceStatus {
        let Some(repository) = self.repository.as_deref() else {
            return PersistenceStatus::Detached;
        };

        match write(repository, &self.snapshots) {
            Ok(()) => PersistenceStatus::Persisted,
            Err(error) => {
                warn!(
                    store = %repository.describe(),
                    %error,
                    "scenario ledger not persisted"
                );
                PersistenceStatus::Failed(error.to_string())
            }
        }
    }
}

impl Default for ScenarioLedger {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for ScenarioLedger {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ScenarioLedger")
            .field("snapshots", &self.snapshots)
            .field(
                "repository",
                &self.repository.as_ref().map(|r| r.describe()),
            )
            .field("load_warning", &self.load_warning)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ProgramTotals;
    use crate::store::MemoryScenarioRepository;

    /// A store that fails every operation.
    struct BrokenRepository;

    impl ScenarioRepository for BrokenRepository {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        fn load(&self) -> Result<Vec<ScenarioSnapshot>, RepositoryError> {
            Err(RepositoryError::Unavailable("disk on fire".to_string()))
        }

        fn store_all(
            &self,
            _snapshots: &[ScenarioSnapshot],
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("read-only".to_string()))
        }

        fn clear(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("read-only".to_string()))
        }
    }

    /// Shares one memory store between the ledger and the test.
    struct SharedRepository(Rc<MemoryScenarioRepository>);

    impl ScenarioRepository for SharedRepository {
        fn describe(&self) -> String {
            self.0.describe()
        }

        fn load(&self) -> Result<Vec<ScenarioSnapshot>, RepositoryError> {
            self.0.load()
        }

        fn store_all(
            &self,
            snapshots: &[ScenarioSnapshot],
        ) -> Result<(), RepositoryError> {
            self.0.store_all(snapshots)
        }

        fn clear(&self) -> Result<(), RepositoryError> {
            self.0.clear()
        }
    }

    fn metrics(
        revenue: rust_decimal::Decimal,
        expense: rust_decimal::Decimal,
    ) -> ScenarioMetrics {
        ScenarioMetrics {
            avg_total_revenue: revenue,
            avg_total_expense: expense,
        }
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut ledger = ScenarioLedger::in_memory();

        let ids: Vec<_> = (0..3)
            .map(|_| ledger.save(metrics(dec!(100), dec!(50))).unwrap().snapshot.id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn ids_restart_after_reset() {
        let mut ledger = ScenarioLedger::in_memory();
        ledger.save(metrics(dec!(100), dec!(50))).unwrap();
        ledger.save(metrics(dec!(100), dec!(50))).unwrap();

        ledger.reset();

        assert!(ledger.compare().is_empty());
        assert_eq!(ledger.save(metrics(dec!(1), dec!(1))).unwrap().snapshot.id, 1);
    }

    #[test]
    fn next_id_follows_highest_loaded_id() {
        let repo = MemoryScenarioRepository::with_snapshots(vec![
            ScenarioSnapshot::new(4, metrics(dec!(10), dec!(5))),
            ScenarioSnapshot::new(2, metrics(dec!(10), dec!(5))),
        ]);
        let mut ledger = ScenarioLedger::open(Box::new(repo));

        assert_eq!(ledger.snapshots()[0].id, 2);
        assert_eq!(ledger.save(metrics(dec!(1), dec!(1))).unwrap().snapshot.id, 5);
    }

    #[test]
    fn in_memory_ledger_is_detached() {
        let mut ledger = ScenarioLedger::in_memory();

        let receipt = ledger.save(metrics(dec!(100), dec!(50))).unwrap();

        assert_eq!(receipt.persistence, PersistenceStatus::Detached);
        assert_eq!(ledger.reset(), PersistenceStatus::Detached);
    }

    #[test]
    fn save_accepts_program_totals() {
        let mut ledger = ScenarioLedger::in_memory();

        let receipt = ledger.save(ProgramTotals::new(dec!(900), dec!(400))).unwrap();

        assert_eq!(receipt.snapshot.avg_total_revenue, dec!(900));
        assert_eq!(receipt.snapshot.avg_total_expense, dec!(400));
    }

    #[test]
    fn compare_derives_profit() {
        let mut ledger = ScenarioLedger::in_memory();
        ledger.save(metrics(dec!(1000), dec!(700))).unwrap();
        ledger.save(metrics(dec!(800), dec!(900))).unwrap();

        assert_eq!(
            ledger.compare(),
            vec![
                ScenarioComparison {
                    id: 1,
                    avg_total_revenue: dec!(1000),
                    avg_total_expense: dec!(700),
                    profit: dec!(300),
                },
                ScenarioComparison {
                    id: 2,
                    avg_total_revenue: dec!(800),
                    avg_total_expense: dec!(900),
                    profit: dec!(-100),
                },
            ]
        );
    }

    #[test]
    fn ranked_by_profit_orders_descending_with_id_tiebreak() {
        let mut ledger = ScenarioLedger::in_memory();
        ledger.save(metrics(dec!(500), dec!(400))).unwrap();
        ledger.save(metrics(dec!(900), dec!(300))).unwrap();
        ledger.save(metrics(dec!(300), dec!(200))).unwrap();

        let ids: Vec<_> = ledger.ranked_by_profit().iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn save_and_reset_reach_the_store() {
        let store = Rc::new(MemoryScenarioRepository::new());
        let mut ledger = ScenarioLedger::open(Box::new(SharedRepository(Rc::clone(&store))));

        let receipt = ledger.save(metrics(dec!(100), dec!(50))).unwrap();

        assert_eq!(receipt.persistence, PersistenceStatus::Persisted);
        assert_eq!(store.load().unwrap(), vec![receipt.snapshot]);

        assert_eq!(ledger.reset(), PersistenceStatus::Persisted);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn unreadable_store_degrades_to_empty_ledger() {
        let ledger = ScenarioLedger::open(Box::new(BrokenRepository));

        assert!(ledger.is_empty());
        assert_eq!(
            ledger.load_warning(),
            Some("Storage unavailable: disk on fire")
        );
    }

    #[test]
    fn failed_write_keeps_snapshot_in_memory() {
        let mut ledger = ScenarioLedger::open(Box::new(BrokenRepository));

        let receipt = ledger.save(metrics(dec!(100), dec!(50))).unwrap();

        assert!(receipt.persistence.is_failure());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.compare()[0].profit, dec!(50));
    }

    #[test]
    fn unreadable_store_is_never_written_by_save() {
        let mut ledger = ScenarioLedger::open(Box::new(BrokenRepository));

        let receipt = ledger.save(metrics(dec!(100), dec!(50))).unwrap();

        assert_eq!(
            receipt.persistence,
            PersistenceStatus::Failed(
                "ledger store was unreadable at open: Storage unavailable: disk on fire".to_string()
            )
        );
    }

    #[test]
    fn last_id_cannot_be_followed() {
        let repo = MemoryScenarioRepository::with_snapshots(vec![ScenarioSnapshot::new(
            u32::MAX,
            metrics(dec!(10), dec!(5)),
        )]);
        let mut ledger = ScenarioLedger::open(Box::new(repo));

        assert_eq!(ledger.next_id(), None);
        assert_eq!(
            ledger.save(metrics(dec!(1), dec!(1))),
            Err(LedgerError::IdsExhausted(u32::MAX))
        );
        assert_eq!(ledger.len(), 1);
    }
}
