//! Core database infrastructure
//!
//! This module provides the foundational database components:
//! - `DocumentBackend`: what the manager needs from a database connection
//! - `MongoBackend`: MongoDB client scoped to the configured database
//! - `Entity`: capability of documents stored in collections

mod connection;

pub use connection::{DocumentBackend, Entity, MongoBackend};
