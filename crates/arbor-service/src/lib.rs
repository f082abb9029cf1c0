//! # arbor-service
//!
//! Folder hierarchy services for Arbor. Every operation enters through
//! [`FolderService`], which checks ownership with [`AccessGuard`], answers
//! reads with [`HierarchyQueryService`], and delegates mutations to
//! [`PathMaintainer`].
//!
//! Services follow constructor injection: the node store is provided at
//! construction time as an `Arc<dyn NodeStore>`.

pub mod context;
pub mod folder;

pub use context::RequestContext;
pub use folder::{AccessGuard, FolderService, HierarchyQueryService, MoveTarget, PathMaintainer};
