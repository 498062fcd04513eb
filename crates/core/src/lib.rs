//! Core types and shared functionality for recipe-radar.
//!
//! This crate provides:
//! - SQLite store for versioned cache partitions and saved favorites
//! - Unified error types
//! - Layered configuration

pub mod config;
pub mod error;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use store::{Favorite, PartitionName, RadarDb, Recipe, RequestIdentity, StoredResponse};
