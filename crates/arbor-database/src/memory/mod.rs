//! In-memory node stores.

pub mod faulty;
pub mod store;

pub use faulty::{FailurePolicy, FaultyNodeStore};
pub use store::MemoryNodeStore;
