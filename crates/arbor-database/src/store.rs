//! Node store contract consumed by the hierarchy services.

use async_trait::async_trait;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;
use arbor_core::types::{FileId, FolderId, UserId};
use arbor_entity::folder::FolderFilter;
use arbor_entity::{FileNode, Folder, ParentList};

/// A fully resolved subtree move, ready to be persisted.
#[derive(Debug, Clone)]
pub struct RelocationPlan {
    /// Owner of every record in the subtree.
    pub owner_id: UserId,
    /// The moved folder, already carrying its new placement.
    pub folder: Folder,
}

impl RelocationPlan {
    /// The folder whose descendants are rewritten.
    pub fn anchor(&self) -> FolderId {
        self.folder.id
    }

    /// The moved folder's new ancestor list; descendants take it as the
    /// segment in front of the anchor.
    pub fn base(&self) -> &ParentList {
        self.folder.parent_list()
    }
}

/// Counts of records rewritten by a relocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelocationReport {
    /// Whether the moved folder itself was written.
    pub folder_moved: bool,
    /// Descendant folders whose ancestor list changed.
    pub folders_rewritten: u64,
    /// Descendant files whose ancestor list changed.
    pub files_rewritten: u64,
}

impl RelocationReport {
    /// Total number of records written.
    pub fn total(&self) -> u64 {
        u64::from(self.folder_moved) + self.folders_rewritten + self.files_rewritten
    }
}

/// Persistence for folder records and file placement records.
///
/// Implementations provide at least read-after-write consistency per record.
/// Writes touch only the columns they name, so a rename and a move of the
/// same record never overwrite each other's fields.
/// Stores that can run several statements in one transaction override
/// [`NodeStore::supports_transactions`] and [`NodeStore::relocate_subtree`].
#[async_trait]
pub trait NodeStore: Send + Sync + std::fmt::Debug + 'static {
    /// Short backend name for logs (e.g. `"postgres"`, `"memory"`).
    fn backend(&self) -> &'static str;

    /// Find a folder by ID.
    async fn find_folder(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Find a file placement record by ID.
    async fn find_file(&self, id: FileId) -> AppResult<Option<FileNode>>;

    /// Direct child folders, oldest first (ties broken by ID).
    async fn find_children(&self, parent: FolderId) -> AppResult<Vec<Folder>>;

    /// Folders matching a resolved filter, sorted and windowed.
    async fn find_folders(&self, filter: &FolderFilter) -> AppResult<Vec<Folder>>;

    /// Folders of `owner_id` with `ancestor` anywhere in their ancestor list.
    async fn find_folders_within(
        &self,
        owner_id: UserId,
        ancestor: FolderId,
    ) -> AppResult<Vec<Folder>>;

    /// Files of `owner_id` with `ancestor` anywhere in their ancestor list.
    async fn find_files_within(
        &self,
        owner_id: UserId,
        ancestor: FolderId,
    ) -> AppResult<Vec<FileNode>>;

    /// Insert a new folder.
    async fn insert_folder(&self, folder: &Folder) -> AppResult<()>;

    /// Insert a new file placement record.
    async fn insert_file(&self, file: &FileNode) -> AppResult<()>;

    /// Write an existing folder's `name` and `updated_at`. Placement columns
    /// are left as stored.
    async fn rename_folder(&self, folder: &Folder) -> AppResult<()>;

    /// Write an existing folder's `parent`, `parent_list` and `updated_at`.
    /// The stored name is left as is.
    async fn place_folder(&self, folder: &Folder) -> AppResult<()>;

    /// Write an existing file's `parent`, `parent_list` and `updated_at`.
    async fn place_file(&self, file: &FileNode) -> AppResult<()>;

    /// Whether [`NodeStore::relocate_subtree`] is available.
    fn supports_transactions(&self) -> bool {
        false
    }

    /// Persist the moved folder and rewrite every descendant in a single
    /// transaction: either all of it is applied or none of it is.
    async fn relocate_subtree(&self, plan: &RelocationPlan) -> AppResult<RelocationReport> {
        Err(AppError::internal(format!(
            "{} store cannot relocate folder {} atomically",
            self.backend(),
            plan.anchor()
        )))
    }

    /// Check store connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}
