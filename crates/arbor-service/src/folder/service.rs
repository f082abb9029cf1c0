//! Folder operations exposed to callers.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use arbor_core::config::HierarchyConfig;
use arbor_core::error::{AppError, ErrorKind};
use arbor_core::types::FolderId;
use arbor_database::NodeStore;
use arbor_entity::folder::{FolderListQuery, FolderSublist, ParentRef};
use arbor_entity::Folder;

use super::access::{folder_not_found, AccessGuard};
use super::path::PathMaintainer;
use super::query::HierarchyQueryService;
use crate::context::RequestContext;

/// Entry point for every folder operation.
///
/// Accepts identifiers in their textual form, scopes each call to the
/// caller's hierarchy, and bounds it by the configured operation timeout.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Read-side queries.
    queries: HierarchyQueryService,
    /// Create, rename, and move.
    paths: PathMaintainer,
    /// Hierarchy settings.
    config: Arc<HierarchyConfig>,
}

impl FolderService {
    /// Creates a folder service over a node store.
    pub fn new(store: Arc<dyn NodeStore>, config: HierarchyConfig) -> Self {
        let config = Arc::new(config);
        let guard = AccessGuard::new(Arc::clone(&store));
        Self {
            queries: HierarchyQueryService::new(
                Arc::clone(&store),
                guard.clone(),
                Arc::clone(&config),
            ),
            paths: PathMaintainer::new(store, guard),
            config,
        }
    }

    /// Gets a folder by ID.
    pub async fn get_folder_info(
        &self,
        ctx: &RequestContext,
        folder_id: &str,
    ) -> Result<Folder, AppError> {
        let folder_id = parse_folder_id(folder_id)?;
        self.bounded(
            "get_folder_info",
            ErrorKind::Timeout,
            self.queries.get_folder_info(ctx.owner_id, folder_id),
        )
        .await
    }

    /// Lists the direct child folders of a folder.
    pub async fn get_folder_sublist(
        &self,
        ctx: &RequestContext,
        folder_id: &str,
    ) -> Result<FolderSublist, AppError> {
        let folder_id = parse_folder_id(folder_id)?;
        self.bounded(
            "get_folder_sublist",
            ErrorKind::Timeout,
            self.queries.get_folder_sublist(ctx.owner_id, folder_id),
        )
        .await
    }

    /// Lists the caller's folders.
    pub async fn get_folder_list(
        &self,
        ctx: &RequestContext,
        query: FolderListQuery,
    ) -> Result<Vec<Folder>, AppError> {
        self.bounded(
            "get_folder_list",
            ErrorKind::Timeout,
            self.queries.get_folder_list(ctx.owner_id, query),
        )
        .await
    }

    /// Gets the breadcrumb trail of a folder.
    pub async fn get_folder_breadcrumbs(
        &self,
        ctx: &RequestContext,
        folder_id: &str,
    ) -> Result<FolderSublist, AppError> {
        let folder_id = parse_folder_id(folder_id)?;
        self.bounded(
            "get_folder_breadcrumbs",
            ErrorKind::Timeout,
            self.queries.get_folder_breadcrumbs(ctx.owner_id, folder_id),
        )
        .await
    }

    /// Creates a folder under `parent` (`"/"` for the top level).
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent: &str,
    ) -> Result<Folder, AppError> {
        let parent = parse_parent(parent)?;
        self.bounded(
            "create_folder",
            ErrorKind::Timeout,
            self.paths.create_folder(ctx.owner_id, name, parent),
        )
        .await
    }

    /// Renames a folder.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: &str,
        new_name: &str,
    ) -> Result<Folder, AppError> {
        let folder_id = parse_folder_id(folder_id)?;
        self.bounded(
            "rename_folder",
            ErrorKind::Timeout,
            self.paths.rename_folder(ctx.owner_id, folder_id, new_name),
        )
        .await
    }

    /// Moves a folder under `new_parent` (`"/"` for the top level).
    ///
    /// A move cut short by the timeout may have been partly applied, so it
    /// is reported as `PartialFailure`; re-running it completes the move.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: &str,
        new_parent: &str,
    ) -> Result<Folder, AppError> {
        let folder_id = parse_folder_id(folder_id)?;
        let new_parent = parse_parent(new_parent)?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            new_parent = %new_parent,
            "Moving folder"
        );

        self.bounded(
            "move_folder",
            ErrorKind::PartialFailure,
            self.paths.move_folder(ctx.owner_id, folder_id, new_parent),
        )
        .await
    }

    /// Run `operation` under the configured timeout; expiry maps to `on_timeout`.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        on_timeout: ErrorKind,
        fut: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        let Some(limit) = self.config.operation_timeout() else {
            return fut.await;
        };
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::new(
                on_timeout,
                format!("{operation} timed out after {}s", limit.as_secs()),
            )),
        }
    }
}

/// Folder IDs that do not parse are reported like missing folders.
fn parse_folder_id(raw: &str) -> Result<FolderId, AppError> {
    FolderId::from_str(raw.trim()).map_err(|_| folder_not_found(raw))
}

/// Destination references accept `"/"` for the root.
fn parse_parent(raw: &str) -> Result<ParentRef, AppError> {
    ParentRef::from_str(raw).map_err(|_| folder_not_found(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparsable_ids_are_not_found() {
        for raw in ["", "/", "123456789012", "not-a-uuid"] {
            let err = parse_folder_id(raw).expect_err("rejected");
            assert_eq!(err.kind, ErrorKind::NotFound);
        }
        assert_eq!(parse_parent(" / ").expect("root"), ParentRef::Root);
        let id = FolderId::new();
        assert_eq!(
            parse_parent(&id.to_string()).expect("folder"),
            ParentRef::Folder(id)
        );
    }
}
