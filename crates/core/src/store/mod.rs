//! SQLite-backed storage for cache partitions and saved favorites.
//!
//! This module provides a persistent store using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Named, versioned cache partitions keyed by request identity
//! - Whole-generation garbage collection in a single transaction
//! - A favorites table that is independent of partition lifecycle
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod favorites;
pub mod hash;
pub mod migrations;
pub mod partitions;

pub use crate::Error;

pub use connection::RadarDb;
pub use favorites::{Favorite, Recipe};
pub use hash::RequestIdentity;
pub use partitions::{PartitionName, StoredResponse};
