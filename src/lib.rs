#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Auxiliary - settings files and database access for server plugins
//!
//! Auxiliary provides two building blocks for long-running server processes:
//!
//! - **[`config`]**: typed settings backed by a JSON file that is created with
//!   defaults on first run and loaded lazily afterwards
//! - **[`database`]**: a MongoDB connection built from those settings, verified
//!   at startup, with raw command execution and typed collection access
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `cli` | `auxiliary` host binary | `clap`, `tracing-subscriber` |
//!
//! The library itself is always available:
//!
//! ```toml
//! auxiliary = { version = "0.1", default-features = false }
//! ```
//!
//! # Quick Start Examples
//!
//! ## Settings
//!
//! ```rust,ignore
//! use auxiliary::config::ConfigStore;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct MotdSettings {
//!     message: String,
//! }
//!
//! // tshock/Motd.json is written with defaults if it does not exist yet
//! let store = ConfigStore::<MotdSettings>::global();
//! let settings = store.load("Motd")?;
//! println!("{}", settings.message);
//!
//! // later, anywhere in the process
//! let settings = ConfigStore::<MotdSettings>::global().settings()?;
//! ```
//!
//! ## Database
//!
//! ```rust,ignore
//! use auxiliary::database::{self, Entity};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Player {
//!     name: String,
//! }
//!
//! impl Entity for Player {}
//!
//! // reads tshock/Auxiliary.json and refuses to start if the server is unreachable
//! let db = database::global("Auxiliary")?;
//!
//! let reply = db.run_command(r#"{"ping": 1}"#)?;
//! let players = db.collection::<Player>("players")?;
//! ```

pub mod config;
pub mod database;
pub mod logging;

// =============================================================================
// Configuration
// =============================================================================

pub use config::{AuxiliarySettings, ConfigError, ConfigStore, Settings};

// =============================================================================
// Database
// =============================================================================

pub use database::{
    BackendError, DatabaseError, DatabaseManager, DocumentBackend, Entity, MongoBackend,
};

// =============================================================================
// Logging
// =============================================================================

pub use logging::LogSeverity;
