//! Settings persistence
//!
//! A [`ConfigStore`] owns one JSON settings file and materializes its contents
//! lazily: the first [`ConfigStore::load`] either reads the file or, when it is
//! missing, writes a default instance to disk and adopts it. Later calls return
//! the already-loaded value without touching the disk again.
//!
//! Settings files live in a namespace directory (`tshock/` by default) and are
//! named after the root passed to `load`:
//!
//! ```text
//! tshock/
//! ├── Auxiliary.json
//! └── <other root>.json
//! ```
//!
//! Files are read leniently (`//` and `/* */` comments, trailing commas) and
//! written back as indented JSON.
//!
//! # Usage
//!
//! ```rust,ignore
//! use auxiliary::config::{AuxiliarySettings, ConfigStore};
//!
//! let store = ConfigStore::<AuxiliarySettings>::global();
//! let settings = store.load("Auxiliary")?;
//! println!("database: {}", settings.default_db);
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// Namespace directory that settings files are created in by default
pub const DEFAULT_CONFIG_DIR: &str = "tshock";

/// Root name of the settings file used by the database layer
pub const DEFAULT_ROOT: &str = "Auxiliary";

// =============================================================================
// Settings capability
// =============================================================================

/// Capability required of every type persisted by a [`ConfigStore`]
///
/// A settings type must be constructible without any input (used when the file
/// does not exist yet) and round-trip through serde. Fields marked
/// `#[serde(skip)]` are never written to disk.
pub trait Settings: Default + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Settings for T where T: Default + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Settings consumed by the database layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuxiliarySettings {
    /// MongoDB connection URL, e.g. `mongodb://localhost:27017`
    #[serde(rename = "connectionstring")]
    pub connection_string: String,

    /// Name of the database commands and collections are scoped to
    #[serde(rename = "defaultdb")]
    pub default_db: String,
}

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while loading or accessing settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `settings()` was called before a successful `load()`
    #[error("settings for `{type_name}` accessed before load() completed")]
    NotInitialized { type_name: &'static str },

    /// The settings file exists but does not contain a valid value
    #[error("encountered invalid JSON in file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Reading or writing the settings file failed
    #[error("I/O error accessing settings at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The default settings could not be serialized
    #[error("failed to serialize default settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// Configuration store
// =============================================================================

/// Lazily-loaded settings file for one settings type
///
/// The file path is resolved once, on the first `load()`, and the loaded value
/// is immutable afterwards. Concurrent first calls are serialized so that a
/// missing file is written exactly once.
pub struct ConfigStore<T: Settings> {
    base_dir: PathBuf,
    path: OnceLock<PathBuf>,
    current: OnceLock<T>,
    load_lock: Mutex<()>,
}

impl<T: Settings> ConfigStore<T> {
    /// Create a store rooted at [`DEFAULT_CONFIG_DIR`]
    pub fn new() -> Self {
        Self::with_base_dir(DEFAULT_CONFIG_DIR)
    }

    /// Create a store whose settings files live under `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            path: OnceLock::new(),
            current: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// Process-wide store for `T`
    ///
    /// Every call with the same `T` returns the same store, rooted at
    /// [`DEFAULT_CONFIG_DIR`].
    pub fn global() -> &'static Self {
        registry_get_or_insert::<T>()
    }

    /// Load the settings, creating `<base_dir>/<root>.json` with defaults if missing
    ///
    /// The path is resolved on the first call only; once the settings are
    /// loaded, later calls return them without reading the file again.
    pub fn load(&self, root: &str) -> Result<&T, ConfigError> {
        if let Some(settings) = self.current.get() {
            return Ok(settings);
        }

        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // another thread may have finished loading while we waited
        if let Some(settings) = self.current.get() {
            return Ok(settings);
        }

        let path = self
            .path
            .get_or_init(|| self.base_dir.join(format!("{}.json", root)));

        let settings = if path.exists() {
            read_settings(path)?
        } else {
            create_settings(&self.base_dir, path)?
        };

        Ok(self.current.get_or_init(|| settings))
    }

    /// The loaded settings
    pub fn settings(&self) -> Result<&T, ConfigError> {
        self.current.get().ok_or(ConfigError::NotInitialized {
            type_name: type_name::<T>(),
        })
    }

    /// Whether `load()` has completed successfully
    pub fn is_loaded(&self) -> bool {
        self.current.get().is_some()
    }

    /// Path of the settings file, once resolved by `load()`
    pub fn path(&self) -> Option<&Path> {
        self.path.get().map(PathBuf::as_path)
    }

    /// Namespace directory the settings file is placed in
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl<T: Settings> Default for ConfigStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn read_settings<T: Settings>(path: &Path) -> Result<T, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let content = String::from_utf8(bytes).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    let settings = json5::from_str::<T>(&content).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    info!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn create_settings<T: Settings>(base_dir: &Path, path: &Path) -> Result<T, ConfigError> {
    fs::create_dir_all(base_dir).map_err(|source| ConfigError::Io {
        path: base_dir.to_path_buf(),
        source,
    })?;

    let settings = T::default();
    let content = serde_json::to_string_pretty(&settings)?;
    fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Created default settings file {}", path.display());
    Ok(settings)
}

// =============================================================================
// Per-type registry
// =============================================================================

type StoreRegistry = Mutex<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>;

static REGISTRY: OnceLock<StoreRegistry> = OnceLock::new();

fn registry_get_or_insert<T: Settings>() -> &'static ConfigStore<T> {
    let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
    let mut stores = registry.lock().unwrap_or_else(PoisonError::into_inner);

    let entry: &'static (dyn Any + Send + Sync) =
        *stores.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!("Registering settings store for {}", type_name::<T>());
            let store: &'static (dyn Any + Send + Sync) =
                Box::leak(Box::new(ConfigStore::<T>::new()));
            store
        });

    match entry.downcast_ref::<ConfigStore<T>>() {
        Some(store) => store,
        // entries are keyed by the TypeId of the store's own settings type
        None => unreachable!("settings registry entry has mismatched type"),
    }
}
