use std::collections::HashMap;

use super::memory::MemoryScenarioRepository;
use super::repository::{RepositoryError, ScenarioRepository};

/// Backend-agnostic ledger storage configuration.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `location` is passed through to that factory
/// unchanged; its meaning is entirely backend-specific.
///
/// | backend  | location examples        |
/// |----------|--------------------------|
/// | `csv`    | `scenario_metrics.csv`   |
/// | `memory` | ignored                  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"csv"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub location: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "csv".to_string(),
            location: "scenario_metrics.csv".to_string(),
        }
    }
}

/// One implementation per storage backend, registered with a
/// [`RepositoryRegistry`] at startup.
pub trait RepositoryFactory {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or prepare) the store and return a ready-to-use repository.
    fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn ScenarioRepository>, RepositoryError>;
}

/// Factory for [`MemoryScenarioRepository`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryRepositoryFactory;

impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn create(
        &self,
        _config: &StoreConfig,
    ) -> Result<Box<dyn ScenarioRepository>, RepositoryError> {
        Ok(Box::new(MemoryScenarioRepository::new()))
    }
}

/// Ledger storage backends by name. Each session asks the registry for its
/// own repository; nothing here is shared between sessions.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry that already knows the in-memory backend.
    pub fn with_memory_backend() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MemoryRepositoryFactory));
        registry
    }

    /// Adds a backend. A factory already registered under the same name is
    /// replaced.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a repository on the backend named by `config.backend`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Configuration`] for an unregistered backend, or
    /// whatever the backend's factory reports.
    pub fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn ScenarioRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config)
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// Records whether `create` was called, then hands out a memory store.
    struct TrackingFactory {
        name: &'static str,
        called: Rc<Cell<bool>>,
    }

    impl RepositoryFactory for TrackingFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        fn create(
            &self,
            _config: &StoreConfig,
        ) -> Result<Box<dyn ScenarioRepository>, RepositoryError> {
            self.called.set(true);
            Ok(Box::new(MemoryScenarioRepository::new()))
        }
    }

    fn config(backend: &str) -> StoreConfig {
        StoreConfig {
            backend: backend.to_string(),
            location: "ignored".to_string(),
        }
    }

    #[test]
    fn empty_registry_has_no_backends() {
        assert!(RepositoryRegistry::new().available_backends().is_empty());
    }

    #[test]
    fn available_backends_are_sorted() {
        let mut registry = RepositoryRegistry::with_memory_backend();
        registry.register(Box::new(TrackingFactory {
            name: "csv",
            called: Rc::new(Cell::new(false)),
        }));

        assert_eq!(registry.available_backends(), vec!["csv", "memory"]);
    }

    #[test]
    fn create_routes_to_matching_factory() {
        let called = Rc::new(Cell::new(false));
        let mut registry = RepositoryRegistry::with_memory_backend();
        registry.register(Box::new(TrackingFactory {
            name: "csv",
            called: Rc::clone(&called),
        }));

        let repo = registry.create(&config("csv"));

        assert!(repo.is_ok());
        assert!(called.get());
    }

    #[test]
    fn create_unknown_backend_is_configuration_error() {
        let registry = RepositoryRegistry::with_memory_backend();

        let result = registry.create(&config("postgres"));

        match result {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("postgres"), "unexpected message: {msg}");
                assert!(msg.contains("memory"), "unexpected message: {msg}");
            }
            Err(other) => panic!("expected Configuration, got {other:?}"),
            Ok(_) => panic!("expected Configuration, got a repository"),
        }
    }

    #[test]
    fn register_replaces_same_backend() {
        let first = Rc::new(Cell::new(false));
        let second = Rc::new(Cell::new(false));
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(TrackingFactory {
            name: "csv",
            called: Rc::clone(&first),
        }));
        registry.register(Box::new(TrackingFactory {
            name: "csv",
            called: Rc::clone(&second),
        }));

        registry.create(&config("csv")).unwrap();

        assert!(!first.get());
        assert!(second.get());
        assert_eq!(registry.available_backends(), vec!["csv"]);
    }

    #[test]
    fn default_config_uses_csv_file() {
        let config = StoreConfig::default();

        assert_eq!(config.backend, "csv");
        assert_eq!(config.location, "scenario_metrics.csv");
    }
}
