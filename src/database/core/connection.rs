//! Database connection management
//!
//! This module provides the backend abstraction the database manager talks to,
//! and the MongoDB implementation of it.

use crate::config::AuxiliarySettings;
use crate::database::error::{BackendError, DatabaseError};
use mongodb::bson::Document;
use mongodb::options::{ClientOptions, ConnectionString};
use mongodb::sync::{Client, Collection, Database};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

/// Capability required of documents stored in a collection
///
/// Implement this for every type read from or written to a collection
/// obtained through the database manager.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {}

/// Connection to a document database scoped to one database
///
/// The manager only needs a connectivity probe, raw command execution and
/// collection handles, so tests can provide an in-process implementation.
pub trait DocumentBackend: Send + Sync {
    /// Typed handle over a named collection
    type Collection<T: Entity>;

    /// Name of the database commands run against
    fn database_name(&self) -> &str;

    /// Lightweight introspection call used to verify connectivity
    fn list_database_names(&self) -> Result<Vec<String>, BackendError>;

    /// Run a command against the database and return the server's reply
    fn run_command(&self, command: Document) -> Result<Document, BackendError>;

    /// Handle over the collection called `name`
    fn collection<T: Entity>(&self, name: &str) -> Self::Collection<T>;
}

/// MongoDB client together with the database it is scoped to
///
/// Both handles are cheap to clone and share one connection pool.
#[derive(Clone, Debug)]
pub struct MongoBackend {
    client: Client,
    database: Database,
}

impl MongoBackend {
    /// Build a client from the connection settings
    ///
    /// This does not contact the server. Steps run in order and stop at the
    /// first failure: parse the connection string, build the client, check the
    /// database name, then scope to the database.
    pub fn connect(settings: &AuxiliarySettings) -> Result<Self, DatabaseError> {
        // syntax check only, no network access
        ConnectionString::parse(&settings.connection_string)
            .map_err(DatabaseError::InvalidConnectionString)?;
        debug!("Parsed connection string");

        // resolves SRV records for mongodb+srv URLs
        let options = ClientOptions::parse(settings.connection_string.as_str())
            .run()
            .map_err(DatabaseError::InvalidConnectionString)?;

        let client = Client::with_options(options).map_err(DatabaseError::Client)?;

        let db_name = settings.default_db.trim();
        if db_name.is_empty() {
            return Err(DatabaseError::MissingDatabaseName);
        }

        let database = client.database(db_name);
        info!("Created database client for '{}'", db_name);

        Ok(Self { client, database })
    }

    /// The underlying driver client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The database handle all commands are scoped to
    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl DocumentBackend for MongoBackend {
    type Collection<T: Entity> = Collection<T>;

    fn database_name(&self) -> &str {
        self.database.name()
    }

    fn list_database_names(&self) -> Result<Vec<String>, BackendError> {
        self.client
            .list_database_names()
            .run()
            .map_err(BackendError::from)
    }

    fn run_command(&self, command: Document) -> Result<Document, BackendError> {
        self.database
            .run_command(command)
            .run()
            .map_err(BackendError::from)
    }

    fn collection<T: Entity>(&self, name: &str) -> Collection<T> {
        self.database.collection::<T>(name)
    }
}
