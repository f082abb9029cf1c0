//! File placement model.
//!
//! File content and its encryption metadata belong to the content storage
//! component. This record only tracks where a file sits in the hierarchy; the
//! `content` references are carried through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use arbor_core::types::{FileId, FolderId, UserId};

use crate::folder::{Folder, ParentList, ParentRef, Placement};

/// A file record as seen by the hierarchy engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FileNode {
    /// Unique file identifier.
    pub id: FileId,
    /// The file name (including extension).
    pub filename: String,
    /// The file owner.
    pub owner_id: UserId,
    /// Immediate parent and materialized ancestor list.
    #[serde(flatten)]
    #[sqlx(flatten)]
    placement: Placement,
    /// Content length in bytes.
    pub length: i64,
    /// Opaque content-storage references and encryption metadata.
    pub content: serde_json::Value,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the placement was last updated.
    pub updated_at: DateTime<Utc>,
}

impl FileNode {
    /// Create a top-level file record.
    pub fn new(
        owner_id: UserId,
        filename: impl Into<String>,
        length: i64,
        content: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: FileId::new(),
            filename: filename.into(),
            owner_id,
            placement: Placement::root(),
            length,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Place the new record inside `folder`.
    pub fn in_folder(mut self, folder: &Folder) -> Self {
        self.placement = folder.child_placement();
        self
    }

    /// Immediate parent.
    pub fn parent(&self) -> ParentRef {
        self.placement.parent()
    }

    /// Ancestors from root to the immediate parent.
    pub fn parent_list(&self) -> &ParentList {
        self.placement.parent_list()
    }

    /// Parent and ancestor list together.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Replace the placement and bump `updated_at`.
    pub fn place(&mut self, placement: Placement) {
        self.placement = placement;
        self.updated_at = Utc::now();
    }

    /// Rebase this file's ancestry below `anchor` onto `base`.
    ///
    /// Returns `false` when nothing changes.
    pub fn rebase(&mut self, anchor: FolderId, base: &ParentList) -> bool {
        match self.placement.rebased(anchor, base) {
            Some(rebased) if rebased != self.placement => {
                self.placement = rebased;
                self.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }
}
