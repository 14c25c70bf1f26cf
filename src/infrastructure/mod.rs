//! Infrastructure layer: task stores, configuration, and backend selection.

pub mod config;
pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use config::{AppConfig, ConfigError, CorsOrigin, StorageBackend};
pub use factory::{FactoryError, RepositoryFactory};
pub use in_memory::InMemoryTaskRepository;
pub use postgres::PostgresTaskRepository;
pub use repository::{RepositoryError, TaskRepository};
