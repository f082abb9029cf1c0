//! Ownership checks for folder operations.

use std::sync::Arc;

use arbor_core::error::AppError;
use arbor_core::types::{FolderId, UserId};
use arbor_database::NodeStore;
use arbor_entity::folder::{ParentRef, Placement};
use arbor_entity::Folder;

/// Where a folder is being moved or created.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveTarget {
    /// The owner's top level.
    Root,
    /// An existing folder of the owner.
    Folder(Folder),
}

impl MoveTarget {
    /// The placement a direct child of this target carries.
    pub fn child_placement(&self) -> Placement {
        match self {
            Self::Root => Placement::root(),
            Self::Folder(folder) => folder.child_placement(),
        }
    }

    /// Reference form of the target.
    pub fn as_parent_ref(&self) -> ParentRef {
        match self {
            Self::Root => ParentRef::Root,
            Self::Folder(folder) => ParentRef::Folder(folder.id),
        }
    }
}

/// Verifies that a folder exists and belongs to the caller.
///
/// A missing folder and a folder owned by someone else are reported with
/// the same error, so callers cannot discover other owners' IDs.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    /// Node store.
    store: Arc<dyn NodeStore>,
}

impl AccessGuard {
    /// Creates a new access guard.
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Fetch a folder the owner is allowed to act on.
    pub async fn authorize_folder(
        &self,
        owner_id: UserId,
        folder_id: FolderId,
    ) -> Result<Folder, AppError> {
        self.store
            .find_folder(folder_id)
            .await?
            .filter(|folder| folder.owner_id == owner_id)
            .ok_or_else(|| folder_not_found(folder_id))
    }

    /// Resolve a destination reference. The root is always allowed.
    pub async fn resolve_target(
        &self,
        owner_id: UserId,
        target: ParentRef,
    ) -> Result<MoveTarget, AppError> {
        match target {
            ParentRef::Root => Ok(MoveTarget::Root),
            ParentRef::Folder(id) => self
                .authorize_folder(owner_id, id)
                .await
                .map(MoveTarget::Folder),
        }
    }
}

/// The error returned for any folder the caller cannot see.
pub(crate) fn folder_not_found(folder_id: impl std::fmt::Display) -> AppError {
    AppError::not_found(format!("Folder {folder_id} not found"))
}
