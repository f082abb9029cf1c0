//! # arbor-database
//!
//! The node store: persistence contract for folder and file placement
//! records, with a PostgreSQL implementation, an in-memory implementation,
//! and a fault-injecting wrapper for exercising interrupted cascades.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::{FailurePolicy, FaultyNodeStore, MemoryNodeStore};
pub use repositories::PgNodeStore;
pub use store::{NodeStore, RelocationPlan, RelocationReport};
