//! Database module
//!
//! This module provides all database functionality, organized into:
//!
//! - **core**: backend abstraction and the MongoDB client wrapper
//! - **manager**: `DatabaseManager`, the verified connection callers work with
//! - **error**: error classification for startup and per-call failures
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   └── connection  # DocumentBackend trait, MongoBackend, Entity
//! ├── manager         # DatabaseManager (probe, commands, collections)
//! └── error           # DatabaseError
//! ```
//!
//! # Startup
//!
//! The manager is built once, in this order, and any failure aborts startup:
//!
//! 1. load the `AuxiliarySettings` (creating the settings file if missing)
//! 2. parse the connection string
//! 3. build the client
//! 4. check that `defaultdb` is set
//! 5. scope the client to that database
//! 6. probe the server with `listDatabases`
//!
//! # Usage
//!
//! Build the manager explicitly and pass it to whatever needs it:
//!
//! ```rust,ignore
//! use auxiliary::config::{AuxiliarySettings, ConfigStore};
//! use auxiliary::database::DatabaseManager;
//!
//! let store = ConfigStore::<AuxiliarySettings>::global();
//! let db = DatabaseManager::initialize(store, "Auxiliary")?;
//!
//! let reply = db.run_command(r#"{"ping": 1}"#)?;
//! let players = db.collection::<Player>("players")?;
//! ```
//!
//! or use the process-wide instance:
//!
//! ```rust,ignore
//! let db = auxiliary::database::global("Auxiliary")?;
//! assert!(db.is_connected());
//! ```

pub mod core;
pub mod error;
pub mod manager;

use crate::config::{AuxiliarySettings, ConfigStore};
use std::sync::{Arc, OnceLock};

pub use self::core::{DocumentBackend, Entity, MongoBackend};
pub use error::{BackendError, DatabaseError};
pub use manager::{parse_command, DatabaseManager};

/// Process-wide database, or the error its initialization failed with
static DATABASE: OnceLock<Result<DatabaseManager, Arc<DatabaseError>>> = OnceLock::new();

/// Process-wide database manager
///
/// The first call initializes it from the global
/// `ConfigStore<AuxiliarySettings>` using `root` as the settings file name;
/// concurrent first calls wait for that single initialization. A failed
/// initialization is permanent: every call returns [`DatabaseError::Startup`]
/// wrapping the original error.
pub fn global(root: &str) -> Result<&'static DatabaseManager, DatabaseError> {
    DATABASE
        .get_or_init(|| {
            DatabaseManager::initialize(ConfigStore::<AuxiliarySettings>::global(), root)
                .map_err(Arc::new)
        })
        .as_ref()
        .map_err(|e| DatabaseError::Startup(Arc::clone(e)))
}
