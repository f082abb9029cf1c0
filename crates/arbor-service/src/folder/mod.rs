//! Folder hierarchy services.

pub mod access;
pub mod path;
pub mod query;
pub mod service;

pub use access::{AccessGuard, MoveTarget};
pub use path::PathMaintainer;
pub use query::HierarchyQueryService;
pub use service::FolderService;
