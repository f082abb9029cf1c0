//! File placement entities.

pub mod model;

pub use model::FileNode;
