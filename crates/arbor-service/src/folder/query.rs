//! Read-only views over an owner's folder hierarchy.

use std::sync::Arc;

use tracing::debug;

use arbor_core::config::HierarchyConfig;
use arbor_core::error::AppError;
use arbor_core::types::{FolderId, UserId};
use arbor_database::NodeStore;
use arbor_entity::folder::{FolderListQuery, FolderSublist, ParentRef};
use arbor_entity::Folder;

use super::access::AccessGuard;

/// Answers folder info, child, list, and breadcrumb queries.
///
/// Reads never fail because of path content, so they can run while a move
/// is rewriting the same subtree.
#[derive(Debug, Clone)]
pub struct HierarchyQueryService {
    /// Node store.
    store: Arc<dyn NodeStore>,
    /// Ownership checks.
    guard: AccessGuard,
    /// Hierarchy settings.
    config: Arc<HierarchyConfig>,
}

impl HierarchyQueryService {
    /// Creates a new query service.
    pub fn new(
        store: Arc<dyn NodeStore>,
        guard: AccessGuard,
        config: Arc<HierarchyConfig>,
    ) -> Self {
        Self {
            store,
            guard,
            config,
        }
    }

    /// Gets a folder owned by the caller.
    pub async fn get_folder_info(
        &self,
        owner_id: UserId,
        folder_id: FolderId,
    ) -> Result<Folder, AppError> {
        self.guard.authorize_folder(owner_id, folder_id).await
    }

    /// Lists the immediate child folders of a folder, oldest first.
    pub async fn get_folder_sublist(
        &self,
        owner_id: UserId,
        folder_id: FolderId,
    ) -> Result<FolderSublist, AppError> {
        let folder = self.guard.authorize_folder(owner_id, folder_id).await?;
        let children = self.store.find_children(folder.id).await?;
        Ok(children
            .into_iter()
            .filter(|child| child.owner_id == owner_id)
            .collect())
    }

    /// Lists the owner's folders. An owner with no folders gets an empty list.
    pub async fn get_folder_list(
        &self,
        owner_id: UserId,
        mut query: FolderListQuery,
    ) -> Result<Vec<Folder>, AppError> {
        query.pagination = query.pagination.clamped(self.config.max_list_limit);
        let filter = query.into_filter(owner_id);
        let folders = self.store.find_folders(&filter).await?;

        debug!(
            owner_id = %owner_id,
            count = folders.len(),
            search = filter.name_contains.is_some(),
            "Listed folders"
        );
        Ok(folders)
    }

    /// The trail from the root down to (and including) a folder.
    ///
    /// The root appears under the configured label with the `"/"` id.
    /// Ancestors that cannot be loaded are left out.
    pub async fn get_folder_breadcrumbs(
        &self,
        owner_id: UserId,
        folder_id: FolderId,
    ) -> Result<FolderSublist, AppError> {
        let folder = self.guard.authorize_folder(owner_id, folder_id).await?;

        let mut trail = FolderSublist::default();
        trail.push(self.config.root_label.clone(), ParentRef::Root);
        for ancestor in folder
            .parent_list()
            .segments()
            .iter()
            .filter_map(ParentRef::folder_id)
        {
            match self.store.find_folder(ancestor).await? {
                Some(found) if found.owner_id == owner_id => {
                    trail.push(found.name, ParentRef::Folder(found.id));
                }
                _ => debug!(folder_id = %ancestor, "Skipping unresolvable ancestor"),
            }
        }
        trail.push(folder.name, ParentRef::Folder(folder.id));

        Ok(trail)
    }
}
