//! Folder domain entities.

pub mod model;
pub mod path;
pub mod query;

pub use model::Folder;
pub use path::{
    InconsistentPlacement, InvalidParentRef, ParentList, ParentRef, Placement, ROOT_SENTINEL,
};
pub use query::{FolderFilter, FolderListQuery, FolderSort, FolderSublist};
