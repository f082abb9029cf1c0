//! Core type definitions used across the Arbor workspace.

pub mod id;
pub mod pagination;
pub mod sorting;

pub use id::*;
pub use pagination::Pagination;
pub use sorting::SortDirection;
