//! Database manager
//!
//! `DatabaseManager` is the entry point for everything that talks to the
//! database. It is created once at startup, verifies that the server answers,
//! and afterwards hands out collection handles and runs raw commands.

use crate::config::{AuxiliarySettings, ConfigStore};
use crate::database::core::{DocumentBackend, Entity, MongoBackend};
use crate::database::error::DatabaseError;
use mongodb::bson::{Bson, Document};
use tracing::{debug, info, warn};

/// Verified database connection shared by all callers
///
/// The backend is immutable after construction; `run_command` and
/// `collection` take `&self` and can be called from any number of threads.
pub struct DatabaseManager<B: DocumentBackend = MongoBackend> {
    backend: B,
}

impl DatabaseManager<MongoBackend> {
    /// Connect to MongoDB using the given settings and verify connectivity
    pub fn connect(settings: &AuxiliarySettings) -> Result<Self, DatabaseError> {
        let backend = MongoBackend::connect(settings)?;
        Self::with_backend(backend)
    }

    /// Load the settings from `store` if needed, then connect
    ///
    /// `root` names the settings file and is only used when the store has not
    /// been loaded yet.
    pub fn initialize(
        store: &ConfigStore<AuxiliarySettings>,
        root: &str,
    ) -> Result<Self, DatabaseError> {
        let settings = if store.is_loaded() {
            store.settings()?
        } else {
            store.load(root)?
        };
        Self::connect(settings)
    }
}

impl<B: DocumentBackend> DatabaseManager<B> {
    /// Wrap an already-built backend, failing if it does not answer the probe
    pub fn with_backend(backend: B) -> Result<Self, DatabaseError> {
        backend
            .list_database_names()
            .map_err(DatabaseError::Connectivity)?;
        info!("Connected to database '{}'", backend.database_name());

        Ok(Self { backend })
    }

    /// Check if the database still answers
    ///
    /// Transport and protocol errors are reported as `false`.
    pub fn is_connected(&self) -> bool {
        match self.backend.list_database_names() {
            Ok(_) => true,
            Err(e) => {
                warn!("Database connectivity check failed: {}", e);
                false
            }
        }
    }

    /// Run a command as if in the shell
    ///
    /// `command` is a single extended-JSON document such as `{"ping": 1}`. The
    /// server's reply is returned as relaxed extended JSON.
    pub fn run_command(&self, command: &str) -> Result<String, DatabaseError> {
        let document = parse_command(command)?;
        debug!("Running command {}", document);

        let reply = self
            .backend
            .run_command(document)
            .map_err(DatabaseError::CommandExecution)?;

        Ok(Bson::Document(reply).into_relaxed_extjson().to_string())
    }

    /// Typed handle over the collection called `name`
    pub fn collection<T: Entity>(&self, name: &str) -> Result<B::Collection<T>, DatabaseError> {
        validate_collection_name(name)?;
        Ok(self.backend.collection::<T>(name))
    }

    /// Name of the database commands and collections are scoped to
    pub fn database_name(&self) -> &str {
        self.backend.database_name()
    }

    /// The underlying backend (for driver features not wrapped here)
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Parse command text into a BSON document
///
/// Extended JSON type wrappers (`{"$oid": ...}`, `{"$date": ...}`) are
/// honored. The top level must be a non-empty document.
pub fn parse_command(command: &str) -> Result<Document, DatabaseError> {
    let value: serde_json::Value = serde_json::from_str(command)
        .map_err(|e| DatabaseError::CommandFormat(e.to_string()))?;

    let bson = Bson::try_from(value).map_err(|e| DatabaseError::CommandFormat(e.to_string()))?;

    match bson {
        Bson::Document(document) if document.is_empty() => Err(DatabaseError::CommandFormat(
            "command document is empty".to_string(),
        )),
        Bson::Document(document) => Ok(document),
        other => Err(DatabaseError::CommandFormat(format!(
            "expected a document, found {:?}",
            other.element_type()
        ))),
    }
}

fn validate_collection_name(name: &str) -> Result<(), DatabaseError> {
    let reason = if name.is_empty() {
        "collection name is empty"
    } else if name.contains('$') {
        "collection name contains '$'"
    } else if name.contains('\0') {
        "collection name contains a null character"
    } else if name.starts_with("system.") {
        "collection names starting with 'system.' are reserved"
    } else {
        return Ok(());
    };

    Err(DatabaseError::CollectionResolution {
        name: name.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::error::BackendError;
    use mongodb::bson::doc;
    use serde::{Deserialize, Serialize};
    use std::fs;
    use std::marker::PhantomData;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize)]
    struct Player {
        name: String,
        level: u32,
    }

    impl Entity for Player {}

    struct FakeCollection<T> {
        name: String,
        _marker: PhantomData<T>,
    }

    struct FakeBackend {
        reachable: AtomicBool,
        probes: AtomicUsize,
        commands: Mutex<Vec<Document>>,
    }

    impl FakeBackend {
        fn new(reachable: bool) -> Self {
            Self {
                reachable: AtomicBool::new(reachable),
                probes: AtomicUsize::new(0),
                commands: Mutex::new(Vec::new()),
            }
        }
    }

    impl DocumentBackend for FakeBackend {
        type Collection<T: Entity> = FakeCollection<T>;

        fn database_name(&self) -> &str {
            "auxiliary"
        }

        fn list_database_names(&self) -> Result<Vec<String>, BackendError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.reachable.load(Ordering::SeqCst) {
                Ok(vec!["admin".to_string(), "auxiliary".to_string()])
            } else {
                Err("server selection timeout".into())
            }
        }

        fn run_command(&self, command: Document) -> Result<Document, BackendError> {
            self.commands.lock().unwrap().push(command.clone());
            if command.contains_key("ping") {
                Ok(doc! { "ok": 1.0 })
            } else {
                Err(format!("no such command: {}", command).into())
            }
        }

        fn collection<T: Entity>(&self, name: &str) -> FakeCollection<T> {
            FakeCollection {
                name: name.to_string(),
                _marker: PhantomData,
            }
        }
    }

    fn ready_manager() -> DatabaseManager<FakeBackend> {
        DatabaseManager::with_backend(FakeBackend::new(true)).unwrap()
    }

    #[test]
    fn test_with_backend_probes_once() {
        let manager = ready_manager();
        assert_eq!(manager.backend().probes.load(Ordering::SeqCst), 1);
        assert_eq!(manager.database_name(), "auxiliary");
    }

    #[test]
    fn test_unreachable_backend_fails_startup() {
        let err = DatabaseManager::with_backend(FakeBackend::new(false))
            .err()
            .unwrap();
        assert!(matches!(err, DatabaseError::Connectivity(_)));
        assert!(err.is_startup());
    }

    #[test]
    fn test_is_connected() {
        let manager = ready_manager();
        assert!(manager.is_connected());

        manager.backend().reachable.store(false, Ordering::SeqCst);
        assert!(!manager.is_connected());

        manager.backend().reachable.store(true, Ordering::SeqCst);
        assert!(manager.is_connected());
    }

    #[test]
    fn test_run_command_ping() {
        let manager = ready_manager();
        let reply = manager.run_command(r#"{"ping": 1}"#).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(parsed["ok"].as_f64(), Some(1.0));

        let commands = manager.backend().commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].contains_key("ping"));
    }

    #[test]
    fn test_run_command_not_json() {
        let manager = ready_manager();
        let err = manager.run_command("not json").unwrap_err();
        assert!(matches!(err, DatabaseError::CommandFormat(_)));
        assert!(!err.is_startup());

        // nothing reached the backend and the connection is unaffected
        assert!(manager.backend().commands.lock().unwrap().is_empty());
        assert!(manager.is_connected());
    }

    #[test]
    fn test_run_command_rejected() {
        let manager = ready_manager();
        let err = manager.run_command(r#"{"frobnicate": 1}"#).unwrap_err();
        assert!(matches!(err, DatabaseError::CommandExecution(_)));
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_parse_command() {
        let document = parse_command(r#"{"find": "players", "filter": {"level": {"$gt": 10}}}"#)
            .unwrap();
        assert_eq!(document.get_str("find").unwrap(), "players");

        let document =
            parse_command(r#"{"delete": "players", "id": {"$oid": "507f1f77bcf86cd799439011"}}"#)
                .unwrap();
        assert!(document.get_object_id("id").is_ok());

        for bad in ["[1, 2]", "42", "\"ping\"", "{}", "{\"ping\": 1", ""] {
            let err = parse_command(bad).unwrap_err();
            assert!(matches!(err, DatabaseError::CommandFormat(_)), "{}", bad);
        }
    }

    #[test]
    fn test_collection() {
        let manager = ready_manager();
        let players = manager.collection::<Player>("players").unwrap();
        assert_eq!(players.name, "players");

        for bad in ["", "bad$name", "nul\0name", "system.users"] {
            let err = manager.collection::<Player>(bad).err().unwrap();
            assert!(matches!(err, DatabaseError::CollectionResolution { .. }));
        }
    }

    #[test]
    fn test_initialize_missing_database_name() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Auxiliary.json"),
            r#"{ "connectionstring": "mongodb://127.0.0.1:1", "defaultdb": "" }"#,
        )
        .unwrap();

        let store = ConfigStore::<AuxiliarySettings>::with_base_dir(dir.path());
        let err = DatabaseManager::initialize(&store, "Auxiliary").err().unwrap();
        assert!(matches!(err, DatabaseError::MissingDatabaseName));
        assert!(store.is_loaded());
    }

    #[test]
    fn test_initialize_creates_settings_file() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::<AuxiliarySettings>::with_base_dir(dir.path());

        // the default settings have an empty connection string
        let err = DatabaseManager::initialize(&store, "Auxiliary").err().unwrap();
        assert!(matches!(err, DatabaseError::InvalidConnectionString(_)));
        assert!(dir.path().join("Auxiliary.json").exists());
    }

    #[test]
    fn test_initialize_malformed_settings() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Auxiliary.json"), "{ not json at all").unwrap();

        let store = ConfigStore::<AuxiliarySettings>::with_base_dir(dir.path());
        let err = DatabaseManager::initialize(&store, "Auxiliary").err().unwrap();
        assert!(matches!(err, DatabaseError::Config(_)));
    }

    #[test]
    fn test_connect_unreachable_server() {
        let settings = AuxiliarySettings {
            connection_string: "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200".to_string(),
            default_db: "auxiliary".to_string(),
        };
        let err = DatabaseManager::connect(&settings).err().unwrap();
        assert!(matches!(err, DatabaseError::Connectivity(_)));
    }

    fn live_settings() -> Option<AuxiliarySettings> {
        std::env::var("AUXILIARY_TEST_MONGODB_URI")
            .ok()
            .map(|uri| AuxiliarySettings {
                connection_string: uri,
                default_db: "auxiliary_test".to_string(),
            })
    }

    #[test]
    #[ignore] // This test requires a running MongoDB server
    fn test_live_ping() {
        let Some(settings) = live_settings() else {
            return;
        };
        let manager = DatabaseManager::connect(&settings).unwrap();
        assert!(manager.is_connected());

        let reply = manager.run_command(r#"{"ping": 1}"#).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(parsed["ok"].as_f64(), Some(1.0));

        assert!(matches!(
            manager.run_command("not json"),
            Err(DatabaseError::CommandFormat(_))
        ));
        assert!(manager.is_connected());
    }

    #[test]
    #[ignore] // This test requires a running MongoDB server
    fn test_live_collection() {
        let Some(settings) = live_settings() else {
            return;
        };
        let manager = DatabaseManager::connect(&settings).unwrap();
        let players = manager.collection::<Player>("players").unwrap();
        assert_eq!(players.name(), "players");
    }
}
