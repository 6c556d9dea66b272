pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{MemoryRepositoryFactory, RepositoryFactory, RepositoryRegistry, StoreConfig};
pub use memory::MemoryScenarioRepository;
pub use repository::{RepositoryError, ScenarioRepository};
