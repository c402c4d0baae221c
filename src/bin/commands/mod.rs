pub mod command;
pub mod config;
pub mod status;

use anyhow::{Context, Result};
use auxiliary::{AuxiliarySettings, ConfigStore, DatabaseManager};
use std::path::PathBuf;

/// Where the host finds its settings
pub struct HostContext {
    store: ConfigStore<AuxiliarySettings>,
    root: String,
}

impl HostContext {
    pub fn new(config_dir: PathBuf, root: String) -> Self {
        Self {
            store: ConfigStore::with_base_dir(config_dir),
            root,
        }
    }

    pub fn store(&self) -> &ConfigStore<AuxiliarySettings> {
        &self.store
    }

    pub fn settings(&self) -> Result<&AuxiliarySettings> {
        self.store
            .load(&self.root)
            .with_context(|| format!("failed to load settings '{}'", self.root))
    }

    pub fn connect(&self) -> Result<DatabaseManager> {
        DatabaseManager::initialize(&self.store, &self.root).context("database startup failed")
    }
}

/// Print an error chain the way the other commands do and exit
pub(crate) fn exit_with(err: anyhow::Error) -> ! {
    eprintln!("ERROR: {:#}", err);
    std::process::exit(1);
}
