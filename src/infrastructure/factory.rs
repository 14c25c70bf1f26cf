//! Repository factory for runtime backend selection.
//!
//! The backend is chosen by [`AppConfig::storage`], which in turn comes from
//! the scheme of `DATABASE_URL`.
//!
//! # Example
//!
//! ```ignore
//! use todo_api::infrastructure::{AppConfig, RepositoryFactory};
//!
//! let config = AppConfig::from_env()?;
//! let repository = RepositoryFactory::new(config).create().await?;
//! ```

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use super::{
    AppConfig, InMemoryTaskRepository, PostgresTaskRepository, RepositoryError, StorageBackend,
    TaskRepository,
};

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),
    /// Schema bootstrap error.
    #[error("Schema initialization error: {0}")]
    Schema(#[from] RepositoryError),
}

/// Factory for creating the task repository based on configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: AppConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Creates the task repository.
    ///
    /// For `PostgreSQL` this opens the connection pool and creates the `tasks`
    /// table if it is missing.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the database connection or schema bootstrap fails.
    pub async fn create(&self) -> Result<Arc<dyn TaskRepository>, FactoryError> {
        match self.config.storage {
            StorageBackend::InMemory => {
                tracing::info!("Using in-memory task store");
                Ok(Arc::new(InMemoryTaskRepository::new()))
            }
            StorageBackend::Postgres => {
                tracing::info!(
                    max_connections = self.config.database_max_connections,
                    "Connecting to PostgreSQL"
                );

                let pool = PgPoolOptions::new()
                    .max_connections(self.config.database_max_connections)
                    .connect(&self.config.database_url)
                    .await
                    .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

                let repository = PostgresTaskRepository::new(pool);
                repository.ensure_schema().await?;

                tracing::info!("PostgreSQL connection established");
                Ok(Arc::new(repository))
            }
        }
    }
}
