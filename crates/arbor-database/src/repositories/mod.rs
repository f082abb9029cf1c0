//! PostgreSQL repositories and the node store built on them.

pub mod file;
pub mod folder;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use arbor_core::error::{AppError, ErrorKind};
use arbor_core::result::AppResult;
use arbor_core::types::{FileId, FolderId, UserId};
use arbor_entity::folder::FolderFilter;
use arbor_entity::{FileNode, Folder};

pub use file::FileRepository;
pub use folder::FolderRepository;

use crate::store::{NodeStore, RelocationPlan, RelocationReport};

/// Node store over the `folders` and `files` tables.
///
/// Subtree relocation runs in one transaction, so a failed move leaves every
/// record as it was.
#[derive(Debug, Clone)]
pub struct PgNodeStore {
    pool: PgPool,
    folders: FolderRepository,
    files: FileRepository,
}

impl PgNodeStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            folders: FolderRepository::new(pool.clone()),
            files: FileRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl NodeStore for PgNodeStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_folder(&self, id: FolderId) -> AppResult<Option<Folder>> {
        self.folders.find_by_id(id).await
    }

    async fn find_file(&self, id: FileId) -> AppResult<Option<FileNode>> {
        self.files.find_by_id(id).await
    }

    async fn find_children(&self, parent: FolderId) -> AppResult<Vec<Folder>> {
        self.folders.find_children(parent).await
    }

    async fn find_folders(&self, filter: &FolderFilter) -> AppResult<Vec<Folder>> {
        self.folders.find_filtered(filter).await
    }

    async fn find_folders_within(
        &self,
        owner_id: UserId,
        ancestor: FolderId,
    ) -> AppResult<Vec<Folder>> {
        self.folders.find_within(owner_id, ancestor).await
    }

    async fn find_files_within(
        &self,
        owner_id: UserId,
        ancestor: FolderId,
    ) -> AppResult<Vec<FileNode>> {
        self.files.find_within(owner_id, ancestor).await
    }

    async fn insert_folder(&self, folder: &Folder) -> AppResult<()> {
        self.folders.create(folder).await
    }

    async fn insert_file(&self, file: &FileNode) -> AppResult<()> {
        self.files.create(file).await
    }

    async fn rename_folder(&self, folder: &Folder) -> AppResult<()> {
        self.folders.rename(folder).await
    }

    async fn place_folder(&self, folder: &Folder) -> AppResult<()> {
        self.folders.place(folder).await
    }

    async fn place_file(&self, file: &FileNode) -> AppResult<()> {
        self.files.update_placement(file).await
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    async fn relocate_subtree(&self, plan: &RelocationPlan) -> AppResult<RelocationReport> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        FolderRepository::place_on(&mut tx, &plan.folder).await?;
        let folders_rewritten =
            FolderRepository::rebase_within(&mut tx, plan.owner_id, plan.anchor(), plan.base())
                .await?;
        let files_rewritten =
            FileRepository::rebase_within(&mut tx, plan.owner_id, plan.anchor(), plan.base())
                .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit relocation", e)
        })?;

        debug!(
            folder_id = %plan.anchor(),
            folders_rewritten,
            files_rewritten,
            "Relocated subtree"
        );

        Ok(RelocationReport {
            folder_moved: true,
            folders_rewritten,
            files_rewritten,
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
