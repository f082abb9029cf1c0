//! In-memory node store using dashmap.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;
use arbor_core::types::{FileId, FolderId, UserId};
use arbor_entity::folder::FolderFilter;
use arbor_entity::{FileNode, Folder};

use crate::store::NodeStore;

/// Node store kept entirely in memory.
///
/// Each record is updated independently; there is no multi-record
/// transaction, so callers run subtree moves step by step.
#[derive(Debug, Clone, Default)]
pub struct MemoryNodeStore {
    folders: Arc<DashMap<FolderId, Folder>>,
    files: Arc<DashMap<FileId, FileNode>>,
}

impl MemoryNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of folder records.
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Number of file records.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_folder(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.folders.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_file(&self, id: FileId) -> AppResult<Option<FileNode>> {
        Ok(self.files.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_children(&self, parent: FolderId) -> AppResult<Vec<Folder>> {
        let mut children: Vec<Folder> = self
            .folders
            .iter()
            .filter(|entry| entry.parent().folder_id() == Some(parent))
            .map(|entry| entry.value().clone())
            .collect();
        children.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(children)
    }

    async fn find_folders(&self, filter: &FolderFilter) -> AppResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .folders
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        folders.sort_by(|a, b| filter.sort.compare(a, b));
        Ok(filter.pagination.apply(folders))
    }

    async fn find_folders_within(
        &self,
        owner_id: UserId,
        ancestor: FolderId,
    ) -> AppResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .folders
            .iter()
            .filter(|entry| entry.owner_id == owner_id && entry.parent_list().contains(ancestor))
            .map(|entry| entry.value().clone())
            .collect();
        folders.sort_by_key(|f| (f.parent_list().len(), f.created_at, f.id.0));
        Ok(folders)
    }

    async fn find_files_within(
        &self,
        owner_id: UserId,
        ancestor: FolderId,
    ) -> AppResult<Vec<FileNode>> {
        let mut files: Vec<FileNode> = self
            .files
            .iter()
            .filter(|entry| entry.owner_id == owner_id && entry.parent_list().contains(ancestor))
            .map(|entry| entry.value().clone())
            .collect();
        files.sort_by_key(|f| (f.parent_list().len(), f.created_at, f.id.0));
        Ok(files)
    }

    async fn insert_folder(&self, folder: &Folder) -> AppResult<()> {
        if self.folders.contains_key(&folder.id) {
            return Err(AppError::database(format!(
                "Folder {} already exists",
                folder.id
            )));
        }
        self.folders.insert(folder.id, folder.clone());
        debug!(folder_id = %folder.id, "Inserted folder");
        Ok(())
    }

    async fn insert_file(&self, file: &FileNode) -> AppResult<()> {
        if self.files.contains_key(&file.id) {
            return Err(AppError::database(format!("File {} already exists", file.id)));
        }
        self.files.insert(file.id, file.clone());
        debug!(file_id = %file.id, "Inserted file");
        Ok(())
    }

    async fn rename_folder(&self, folder: &Folder) -> AppResult<()> {
        match self.folders.get_mut(&folder.id) {
            Some(mut entry) if entry.owner_id == folder.owner_id => {
                entry.name = folder.name.clone();
                entry.updated_at = folder.updated_at;
                Ok(())
            }
            _ => Err(AppError::not_found(format!("Folder {} not found", folder.id))),
        }
    }

    async fn place_folder(&self, folder: &Folder) -> AppResult<()> {
        match self.folders.get_mut(&folder.id) {
            Some(mut entry) if entry.owner_id == folder.owner_id => {
                entry.place(folder.placement().clone());
                entry.updated_at = folder.updated_at;
                Ok(())
            }
            _ => Err(AppError::not_found(format!("Folder {} not found", folder.id))),
        }
    }

    async fn place_file(&self, file: &FileNode) -> AppResult<()> {
        match self.files.get_mut(&file.id) {
            Some(mut entry) if entry.owner_id == file.owner_id => {
                entry.place(file.placement().clone());
                entry.updated_at = file.updated_at;
                Ok(())
            }
            _ => Err(AppError::not_found(format!("File {} not found", file.id))),
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
