//! # arbor-entity
//!
//! Domain entity models for Arbor. Folders and file placements carry a
//! materialized ancestor list; the path types in [`folder::path`] keep that
//! list derived from the hierarchy. Database entities derive `sqlx::FromRow`.

pub mod file;
pub mod folder;

pub use file::FileNode;
pub use folder::{Folder, FolderListQuery, FolderSublist, ParentList, ParentRef, Placement};
