//! CSV backend for the scenario ledger.
//!
//! The file holds one row per saved scenario:
//!
//! ```csv
//! Scenario,Avg Total Revenue,Avg Total Expense
//! 1,90240000,45120000
//! ```
//!
//! A missing file is an empty ledger; clearing the ledger deletes the file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clinic_core::store::{RepositoryFactory, StoreConfig};
use clinic_core::{RepositoryError, ScenarioRepository, ScenarioSnapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct ScenarioRow {
    #[serde(rename = "Scenario")]
    scenario: u32,
    #[serde(rename = "Avg Total Revenue")]
    avg_total_revenue: Decimal,
    #[serde(rename = "Avg Total Expense")]
    avg_total_expense: Decimal,
}

impl From<&ScenarioSnapshot> for ScenarioRow {
    fn from(snapshot: &ScenarioSnapshot) -> Self {
        Self {
            scenario: snapshot.id,
            avg_total_revenue: snapshot.avg_total_revenue,
            avg_total_expense: snapshot.avg_total_expense,
        }
    }
}

impl From<ScenarioRow> for ScenarioSnapshot {
    fn from(row: ScenarioRow) -> Self {
        Self {
            id: row.scenario,
            avg_total_revenue: row.avg_total_revenue,
            avg_total_expense: row.avg_total_expense,
        }
    }
}

/// Scenario snapshots kept in a single CSV file.
#[derive(Debug, Clone)]
pub struct CsvScenarioRepository {
    path: PathBuf,
}

impl CsvScenarioRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(
        &self,
        err: impl std::fmt::Display,
    ) -> RepositoryError {
        RepositoryError::Unavailable(format!("{}: {err}", self.path.display()))
    }
}

impl ScenarioRepository for CsvScenarioRepository {
    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }

    fn load(&self) -> Result<Vec<ScenarioSnapshot>, RepositoryError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No scenario file yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.unavailable(err)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let snapshots = reader
            .deserialize::<ScenarioRow>()
            .enumerate()
            .map(|(idx, result)| {
                result.map(ScenarioSnapshot::from).map_err(|err| {
                    RepositoryError::Corrupt(format!(
                        "{} row {}: {err}",
                        self.path.display(),
                        idx + 1
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(path = %self.path.display(), count = snapshots.len(), "Loaded scenarios");
        Ok(snapshots)
    }

    fn store_all(
        &self,
        snapshots: &[ScenarioSnapshot],
    ) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.unavailable(err))?;
        }

        let mut writer = csv::Writer::from_path(&self.path).map_err(|err| self.unavailable(err))?;
        for snapshot in snapshots {
            writer
                .serialize(ScenarioRow::from(snapshot))
                .map_err(|err| self.unavailable(err))?;
        }
        // An empty ledger still gets a header row.
        if snapshots.is_empty() {
            writer
                .write_record(["Scenario", "Avg Total Revenue", "Avg Total Expense"])
                .map_err(|err| self.unavailable(err))?;
        }
        writer.flush().map_err(|err| self.unavailable(err))?;

        debug!(path = %self.path.display(), count = snapshots.len(), "Stored scenarios");
        Ok(())
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.unavailable(err)),
        }
    }
}

/// Registers the `csv` backend; `location` is the file path.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRepositoryFactory;

impl RepositoryFactory for CsvRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "csv"
    }

    fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn ScenarioRepository>, RepositoryError> {
        if config.location.trim().is_empty() {
            return Err(RepositoryError::Configuration(
                "csv backend needs a file location".to_string(),
            ));
        }
        Ok(Box::new(CsvScenarioRepository::new(&config.location)))
    }
}

#[cfg(test)]
mod tests {
    use clinic_core::ScenarioMetrics;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn snapshot(
        id: u32,
        revenue: Decimal,
        expense: Decimal,
    ) -> ScenarioSnapshot {
        ScenarioSnapshot::new(
            id,
            ScenarioMetrics {
                avg_total_revenue: revenue,
                avg_total_expense: expense,
            },
        )
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvScenarioRepository::new(dir.path().join("scenario_metrics.csv"));

        assert_eq!(repo.load().unwrap(), Vec::new());
    }

    #[test]
    fn store_then_load_keeps_exact_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvScenarioRepository::new(dir.path().join("scenario_metrics.csv"));
        let snapshots = vec![
            snapshot(1, dec!(90240000), dec!(45120000.50)),
            snapshot(2, dec!(1000), dec!(0)),
        ];

        repo.store_all(&snapshots).unwrap();

        assert_eq!(repo.load().unwrap(), snapshots);
    }

    #[test]
    fn file_uses_scenario_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario_metrics.csv");
        let repo = CsvScenarioRepository::new(&path);

        repo.store_all(&[snapshot(1, dec!(10), dec!(4))]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents.lines().next(),
            Some("Scenario,Avg Total Revenue,Avg Total Expense")
        );
    }

    #[test]
    fn storing_nothing_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario_metrics.csv");
        let repo = CsvScenarioRepository::new(&path);

        repo.store_all(&[]).unwrap();

        assert_eq!(repo.load().unwrap(), Vec::new());
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn clear_removes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario_metrics.csv");
        let repo = CsvScenarioRepository::new(&path);

        repo.store_all(&[snapshot(1, dec!(10), dec!(4))]).unwrap();
        repo.clear().unwrap();
        assert!(!path.exists());
        repo.clear().unwrap();
    }

    #[test]
    fn corrupt_row_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario_metrics.csv");
        fs::write(
            &path,
            "Scenario,Avg Total Revenue,Avg Total Expense\n1,10,4\nx,10,4\n",
        )
        .unwrap();

        let err = CsvScenarioRepository::new(&path).load().unwrap_err();

        assert!(matches!(err, RepositoryError::Corrupt(ref msg) if msg.contains("row 2")));
    }

    #[test]
    fn store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger").join("scenario_metrics.csv");

        CsvScenarioRepository::new(&path)
            .store_all(&[snapshot(1, dec!(1), dec!(1))])
            .unwrap();

        assert!(path.exists());
    }

    #[test]
    fn factory_requires_location() {
        let config = StoreConfig {
            backend: "csv".to_string(),
            location: " ".to_string(),
        };

        assert!(matches!(
            CsvRepositoryFactory.create(&config),
            Err(RepositoryError::Configuration(_))
        ));
    }
}
