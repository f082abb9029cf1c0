//! Shared fixtures for folder service tests.

#![allow(dead_code)]

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use arbor_core::config::HierarchyConfig;
use arbor_core::result::AppResult;
use arbor_core::types::{FileId, FolderId, UserId};
use arbor_database::{FailurePolicy, FaultyNodeStore, MemoryNodeStore, NodeStore};
use arbor_entity::folder::FolderFilter;
use arbor_entity::{FileNode, Folder};
use arbor_service::{FolderService, RequestContext};

/// Folder service over an in-memory store whose writes can be made to fail.
pub struct TestApp {
    /// The store behind the service.
    pub store: Arc<FaultyNodeStore<MemoryNodeStore>>,
    /// The service under test.
    pub service: FolderService,
    /// Context of the owner that creates the fixtures.
    pub ctx: RequestContext,
}

impl TestApp {
    /// Create an app with default hierarchy settings.
    pub fn new() -> Self {
        Self::with_config(HierarchyConfig::default())
    }

    /// Create an app with the given hierarchy settings.
    pub fn with_config(config: HierarchyConfig) -> Self {
        let store = Arc::new(FaultyNodeStore::new(
            MemoryNodeStore::new(),
            FailurePolicy::Never,
        ));
        let service = FolderService::new(store.clone(), config);
        Self {
            store,
            service,
            ctx: RequestContext::new(UserId::new()),
        }
    }

    /// A context for some other owner.
    pub fn stranger(&self) -> RequestContext {
        RequestContext::new(UserId::new())
    }

    /// Create a folder through the service; `parent` is `None` for the top level.
    pub async fn folder_in(&self, name: &str, parent: Option<&Folder>) -> Folder {
        let parent = parent.map_or_else(|| "/".to_string(), |p| p.id.to_string());
        self.service
            .create_folder(&self.ctx, name, &parent)
            .await
            .expect("Failed to create folder")
    }

    /// Place a file record directly in the store, as the content layer would.
    pub async fn file_in(&self, filename: &str, folder: &Folder) -> FileNode {
        let file = FileNode::new(
            self.ctx.owner_id,
            filename,
            42,
            serde_json::json!({ "iv": "00ff", "chunks": ["c1"] }),
        )
        .in_folder(folder);
        self.store
            .insert_file(&file)
            .await
            .expect("Failed to insert file");
        file
    }

    /// Current stored state of a folder.
    pub async fn folder(&self, id: FolderId) -> Folder {
        self.store
            .find_folder(id)
            .await
            .expect("Failed to read folder")
            .expect("Folder missing")
    }

    /// Current stored state of a file.
    pub async fn file(&self, id: FileId) -> FileNode {
        self.store
            .find_file(id)
            .await
            .expect("Failed to read file")
            .expect("File missing")
    }

    /// Change the store's failure policy.
    pub fn fail_with(&self, policy: FailurePolicy) {
        self.store
            .set_policy(policy)
            .expect("Failed to set failure policy");
    }
}

/// A chain `F1 -> F2 -> F3` with one file in each, plus an unrelated `F4`.
pub struct Chain {
    pub f1: Folder,
    pub f2: Folder,
    pub f3: Folder,
    pub f4: Folder,
    pub file1: FileNode,
    pub file2: FileNode,
    pub file3: FileNode,
}

impl Chain {
    /// Build the chain inside `app`.
    pub async fn build(app: &TestApp) -> Self {
        let f1 = app.folder_in("F1", None).await;
        let f2 = app.folder_in("F2", Some(&f1)).await;
        let f3 = app.folder_in("F3", Some(&f2)).await;
        let f4 = app.folder_in("F4", None).await;
        let file1 = app.file_in("one.txt", &f1).await;
        let file2 = app.file_in("two.txt", &f2).await;
        let file3 = app.file_in("three.txt", &f3).await;
        Self {
            f1,
            f2,
            f3,
            f4,
            file1,
            file2,
            file3,
        }
    }

    /// Stored state of every record in the chain.
    pub async fn snapshot(&self, app: &TestApp) -> (Vec<Folder>, Vec<FileNode>) {
        let mut folders = Vec::new();
        for id in [self.f1.id, self.f2.id, self.f3.id, self.f4.id] {
            folders.push(app.folder(id).await);
        }
        let mut files = Vec::new();
        for id in [self.file1.id, self.file2.id, self.file3.id] {
            files.push(app.file(id).await);
        }
        (folders, files)
    }
}

/// Store writes a hook can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Rename,
    PlaceFolder,
    PlaceFile,
}

type Hook = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Pending {
    kind: WriteKind,
    skip: usize,
    run: Hook,
}

/// Memory store that runs one piece of work right before a chosen write,
/// so that another operation lands between a caller's read and its write.
pub struct InterleavedStore {
    inner: MemoryNodeStore,
    pending: Mutex<Option<Pending>>,
}

impl fmt::Debug for InterleavedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterleavedStore")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl InterleavedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryNodeStore::new(),
            pending: Mutex::new(None),
        }
    }

    /// The shared records, without the hook.
    pub fn inner(&self) -> &MemoryNodeStore {
        &self.inner
    }

    /// Run `work` before the write of `kind` that follows `skip` others of
    /// the same kind.
    pub fn before<F>(&self, kind: WriteKind, skip: usize, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        *self.pending.lock().expect("hook lock") = Some(Pending {
            kind,
            skip,
            run: Box::pin(work),
        });
    }

    /// Whether the armed work has run.
    pub fn fired(&self) -> bool {
        self.pending.lock().expect("hook lock").is_none()
    }

    async fn interleave(&self, kind: WriteKind) {
        let hook = {
            let mut slot = self.pending.lock().expect("hook lock");
            let ready = match slot.as_mut() {
                Some(pending) if pending.kind == kind => {
                    if pending.skip == 0 {
                        true
                    } else {
                        pending.skip -= 1;
                        false
                    }
                }
                _ => false,
            };
            if ready { slot.take().map(|p| p.run) } else { None }
        };
        if let Some(hook) = hook {
            hook.await;
        }
    }
}

#[async_trait]
impl NodeStore for InterleavedStore {
    fn backend(&self) -> &'static str {
        "interleaved"
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
        self.interleave(WriteKind::Rename).await;
        self.inner.rename_folder(folder).await
    }

    async fn place_folder(&self, folder: &Folder) -> AppResult<()> {
        self.interleave(WriteKind::PlaceFolder).await;
        self.inner.place_folder(folder).await
    }

    async fn place_file(&self, file: &FileNode) -> AppResult<()> {
        self.interleave(WriteKind::PlaceFile).await;
        self.inner.place_file(file).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Two services over the same records. Writes made through `service` can
/// be interleaved with calls made through `other`.
pub struct InterleavedApp {
    pub store: Arc<InterleavedStore>,
    pub service: FolderService,
    pub other: FolderService,
    pub ctx: RequestContext,
}

impl InterleavedApp {
    pub fn new() -> Self {
        let store = Arc::new(InterleavedStore::new());
        let service = FolderService::new(store.clone(), HierarchyConfig::default());
        let other = FolderService::new(
            Arc::new(store.inner().clone()),
            HierarchyConfig::default(),
        );
        Self {
            store,
            service,
            other,
            ctx: RequestContext::new(UserId::new()),
        }
    }

    /// Create a folder without going through the hook.
    pub async fn folder_in(&self, name: &str, parent: Option<&Folder>) -> Folder {
        let parent = parent.map_or_else(|| "/".to_string(), |p| p.id.to_string());
        self.other
            .create_folder(&self.ctx, name, &parent)
            .await
            .expect("Failed to create folder")
    }

    /// Place a file record directly in the shared store.
    pub async fn file_in(&self, filename: &str, folder: &Folder) -> FileNode {
        let file = FileNode::new(self.ctx.owner_id, filename, 1, serde_json::Value::Null)
            .in_folder(folder);
        self.store
            .inner()
            .insert_file(&file)
            .await
            .expect("Failed to insert file");
        file
    }

    /// Current stored state of a folder.
    pub async fn folder(&self, id: FolderId) -> Folder {
        self.store
            .inner()
            .find_folder(id)
            .await
            .expect("Failed to read folder")
            .expect("Folder missing")
    }
}
