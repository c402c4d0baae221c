//! Database error types

use crate::config::ConfigError;
use std::sync::Arc;
use thiserror::Error;

/// Error reported by a [`DocumentBackend`](super::DocumentBackend)
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while bootstrapping or using the database
///
/// Everything up to and including `Connectivity` happens during startup and
/// means the database is unusable. `CommandFormat`, `CommandExecution` and
/// `CollectionResolution` are per-call failures.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database settings could not be loaded
    #[error("failed to load database settings: {0}")]
    Config(#[from] ConfigError),

    /// The connection string is not a valid MongoDB URL
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(#[source] mongodb::error::Error),

    /// The driver refused to build a client from the parsed options
    #[error("failed to create database client: {0}")]
    Client(#[source] mongodb::error::Error),

    /// `defaultdb` is empty
    #[error("no default database name configured (`defaultdb` is empty)")]
    MissingDatabaseName,

    /// The startup probe could not reach the server
    #[error("database could not connect: {0}")]
    Connectivity(#[source] BackendError),

    /// The command text is not a single JSON document
    #[error("command is not a valid document: {0}")]
    CommandFormat(String),

    /// The server rejected the command
    #[error("command failed: {0}")]
    CommandExecution(#[source] BackendError),

    /// No collection handle can be produced for the given name
    #[error("cannot resolve collection '{name}': {reason}")]
    CollectionResolution { name: String, reason: &'static str },

    /// Initialization of the shared database failed earlier in this process
    #[error("database initialization failed: {0}")]
    Startup(#[source] Arc<DatabaseError>),
}

impl DatabaseError {
    /// Whether the error comes from bootstrapping rather than from a single call
    pub fn is_startup(&self) -> bool {
        !matches!(
            self,
            DatabaseError::CommandFormat(_)
                | DatabaseError::CommandExecution(_)
                | DatabaseError::CollectionResolution { .. }
        )
    }
}
