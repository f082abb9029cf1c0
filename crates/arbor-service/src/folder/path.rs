//! Folder mutations that keep materialized paths consistent.
//!
//! A folder's `parent_list` is never written directly: it is derived from
//! the destination when a folder is created or moved, and descendants are
//! rebased onto the moved folder's new list.

use std::sync::Arc;

use tracing::{info, warn};

use arbor_core::error::{AppError, ErrorKind};
use arbor_core::types::{FolderId, UserId};
use arbor_database::{NodeStore, RelocationPlan, RelocationReport};
use arbor_entity::folder::ParentRef;
use arbor_entity::Folder;

use super::access::{AccessGuard, MoveTarget};

/// Creates, renames, and moves folders.
#[derive(Debug, Clone)]
pub struct PathMaintainer {
    /// Node store.
    store: Arc<dyn NodeStore>,
    /// Ownership checks.
    guard: AccessGuard,
}

impl PathMaintainer {
    /// Creates a new path maintainer.
    pub fn new(store: Arc<dyn NodeStore>, guard: AccessGuard) -> Self {
        Self { store, guard }
    }

    /// Creates a folder under `parent` with a derived ancestor list.
    pub async fn create_folder(
        &self,
        owner_id: UserId,
        name: &str,
        parent: ParentRef,
    ) -> Result<Folder, AppError> {
        let name = validate_name(name)?;
        let target = self.guard.resolve_target(owner_id, parent).await?;

        let folder = Folder::new(owner_id, name, target.child_placement());
        self.store.insert_folder(&folder).await?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder.id,
            parent = %folder.parent(),
            "Folder created"
        );

        Ok(folder)
    }

    /// Renames a folder. Placement is left untouched.
    pub async fn rename_folder(
        &self,
        owner_id: UserId,
        folder_id: FolderId,
        new_name: &str,
    ) -> Result<Folder, AppError> {
        let new_name = validate_name(new_name)?;
        let mut folder = self.guard.authorize_folder(owner_id, folder_id).await?;

        folder.rename(new_name);
        self.store.rename_folder(&folder).await?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            new_name = %folder.name,
            "Folder renamed"
        );

        Ok(folder)
    }

    /// Moves a folder under `new_parent` and rebases every folder and file
    /// below it.
    ///
    /// On a transactional store the whole move is applied or nothing is.
    /// Otherwise the folder is written first, then its descendants; a fault
    /// after the first write yields `PartialFailure` and re-running the same
    /// move completes it.
    pub async fn move_folder(
        &self,
        owner_id: UserId,
        folder_id: FolderId,
        new_parent: ParentRef,
    ) -> Result<Folder, AppError> {
        let mut folder = self.guard.authorize_folder(owner_id, folder_id).await?;
        let target = self.guard.resolve_target(owner_id, new_parent).await?;

        if let MoveTarget::Folder(destination) = &target {
            if destination.is_within(folder.id) {
                return Err(AppError::invalid_operation(format!(
                    "Cannot move folder {} into itself or one of its descendants",
                    folder.id
                )));
            }
        }

        let placement = target.child_placement();
        let node_changed = *folder.placement() != placement;
        if node_changed {
            folder.place(placement);
        }

        let report = if self.store.supports_transactions() {
            if !node_changed {
                return Ok(folder);
            }
            self.store
                .relocate_subtree(&RelocationPlan {
                    owner_id,
                    folder: folder.clone(),
                })
                .await?
        } else {
            self.relocate_stepwise(&folder, node_changed).await?
        };

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            new_parent = %target.as_parent_ref(),
            rewritten = report.total(),
            backend = self.store.backend(),
            "Folder moved"
        );

        Ok(folder)
    }

    /// Write the moved folder, then rebase its descendants one record at a time.
    async fn relocate_stepwise(
        &self,
        folder: &Folder,
        node_changed: bool,
    ) -> Result<RelocationReport, AppError> {
        let mut report = RelocationReport::default();
        if node_changed {
            self.store.place_folder(folder).await?;
            report.folder_moved = true;
        }

        if let Err(e) = self.rebase_descendants(folder, &mut report).await {
            warn!(
                owner_id = %folder.owner_id,
                folder_id = %folder.id,
                folder_moved = report.folder_moved,
                folders_rewritten = report.folders_rewritten,
                files_rewritten = report.files_rewritten,
                error = %e,
                "Folder move interrupted"
            );
            return Err(AppError::with_source(
                ErrorKind::PartialFailure,
                format!(
                    "Move of folder {} interrupted after {} record(s) written; retry the move",
                    folder.id,
                    report.total()
                ),
                e,
            ));
        }

        Ok(report)
    }

    async fn rebase_descendants(
        &self,
        folder: &Folder,
        report: &mut RelocationReport,
    ) -> Result<(), AppError> {
        let base = folder.parent_list();

        for mut descendant in self
            .store
            .find_folders_within(folder.owner_id, folder.id)
            .await?
        {
            if descendant.rebase(folder.id, base) {
                self.store.place_folder(&descendant).await?;
                report.folders_rewritten += 1;
            }
        }

        for mut file in self
            .store
            .find_files_within(folder.owner_id, folder.id)
            .await?
        {
            if file.rebase(folder.id, base) {
                self.store.place_file(&file).await?;
                report.files_rewritten += 1;
            }
        }

        Ok(())
    }
}

/// Trim a folder name and reject blank ones.
fn validate_name(name: &str) -> Result<&str, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    Ok(trimmed)
}
