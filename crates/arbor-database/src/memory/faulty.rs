//! Fault-injecting node store.
//!
//! Wraps another store and fails writes according to a [`FailurePolicy`],
//! which is how interrupted subtree moves and their recovery are exercised
//! without a real storage outage.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::warn;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;
use arbor_core::types::{FileId, FolderId, UserId};
use arbor_entity::folder::FolderFilter;
use arbor_entity::{FileNode, Folder};

use crate::store::{NodeStore, RelocationPlan, RelocationReport};

/// When writes should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Never fail (passthrough).
    Never,
    /// Let `n` writes through, then fail every later one.
    AfterWrites(usize),
    /// Fail writes to this folder.
    OnFolder(FolderId),
    /// Fail writes to this file.
    OnFile(FileId),
}

/// A [`NodeStore`] wrapper that can simulate storage faults on writes.
///
/// Inserts and reads always pass through.
#[derive(Debug)]
pub struct FaultyNodeStore<S: NodeStore> {
    inner: S,
    policy: Mutex<FailurePolicy>,
    writes: AtomicUsize,
}

impl<S: NodeStore> FaultyNodeStore<S> {
    /// Wrap `inner` with the given policy.
    pub fn new(inner: S, policy: FailurePolicy) -> Self {
        Self {
            inner,
            policy: Mutex::new(policy),
            writes: AtomicUsize::new(0),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of writes that went through.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Replace the policy and reset the write counter.
    pub fn set_policy(&self, policy: FailurePolicy) -> AppResult<()> {
        let mut current = self
            .policy
            .lock()
            .map_err(|_| AppError::internal("Failure policy lock poisoned"))?;
        *current = policy;
        self.writes.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn check(&self, target: Target) -> AppResult<()> {
        let policy = self
            .policy
            .lock()
            .map_err(|_| AppError::internal("Failure policy lock poisoned"))?;
        let fail = match (&*policy, target) {
            (FailurePolicy::Never, _) => false,
            (FailurePolicy::AfterWrites(n), _) => self.write_count() >= *n,
            (FailurePolicy::OnFolder(id), Target::Folder(folder)) => *id == folder,
            (FailurePolicy::OnFile(id), Target::File(file)) => *id == file,
            _ => false,
        };
        if fail {
            warn!(?target, "Injected storage fault");
            return Err(AppError::database(format!("Injected write failure on {target:?}")));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Folder(FolderId),
    File(FileId),
}

#[async_trait]
impl<S: NodeStore> NodeStore for FaultyNodeStore<S> {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn find_folder(&self, id: FolderId) -> AppResult<Option<Folder>> {
        self.inner.find_folder(id).await
    }

    async fn find_file(&self, id: FileId) -> AppResult<Option<FileNode>> {
        self.inner.find_file(id).await
    }

    async fn find_children(&self, parent: FolderId) -> AppResult<Vec<Folder>> {
        self.inner.find_children(parent).await
    }

    async fn find_folders(&self, filter: &FolderFilter) -> AppResult<Vec<Folder>> {
        self.inner.find_folders(filter).await
    }

    async fn find_folders_within(
        &self,
        owner_id: UserId,
        ancestor: FolderId,
    ) -> AppResult<Vec<Folder>> {
        self.inner.find_folders_within(owner_id, ancestor).await
    }

    async fn find_files_within(
        &self,
        owner_id: UserId,
        ancestor: FolderId,
    ) -> AppResult<Vec<FileNode>> {
        self.inner.find_files_within(owner_id, ancestor).await
    }

    async fn insert_folder(&self, folder: &Folder) -> AppResult<()> {
        self.inner.insert_folder(folder).await
    }

    async fn insert_file(&self, file: &FileNode) -> AppResult<()> {
        self.inner.insert_file(file).await
    }

    async fn rename_folder(&self, folder: &Folder) -> AppResult<()> {
        self.check(Target::Folder(folder.id))?;
        self.inner.rename_folder(folder).await?;
        self.record_write();
        Ok(())
    }

    async fn place_folder(&self, folder: &Folder) -> AppResult<()> {
        self.check(Target::Folder(folder.id))?;
        self.inner.place_folder(folder).await?;
        self.record_write();
        Ok(())
    }

    async fn place_file(&self, file: &FileNode) -> AppResult<()> {
        self.check(Target::File(file.id))?;
        self.inner.place_file(file).await?;
        self.record_write();
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        self.inner.supports_transactions()
    }

    async fn relocate_subtree(&self, plan: &RelocationPlan) -> AppResult<RelocationReport> {
        self.check(Target::Folder(plan.anchor()))?;
        self.inner.relocate_subtree(plan).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
