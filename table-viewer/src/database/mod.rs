//! Database abstraction layer
//!
//! This module provides a database-agnostic interface for the gateway
//! endpoints: listing, reading and single-row mutations.

pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the main trait
pub use traits::{DatabaseError, DatabaseProvider};
