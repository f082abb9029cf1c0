//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use arbor_core::types::{FolderId, UserId};

use super::path::{ParentList, ParentRef, Placement};

/// A folder in an owner's hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// The folder owner.
    pub owner_id: UserId,
    /// Immediate parent and materialized ancestor list.
    #[serde(flatten)]
    #[sqlx(flatten)]
    placement: Placement,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Create a new folder record at the given placement.
    pub fn new(owner_id: UserId, name: impl Into<String>, placement: Placement) -> Self {
        let now = Utc::now();
        Self {
            id: FolderId::new(),
            name: name.into(),
            owner_id,
            placement,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is a top-level folder.
    pub fn is_top_level(&self) -> bool {
        self.placement.parent().is_root()
    }

    /// Immediate parent.
    pub fn parent(&self) -> ParentRef {
        self.placement.parent()
    }

    /// Ancestors from root to the immediate parent.
    pub fn parent_list(&self) -> &ParentList {
        self.placement.parent_list()
    }

    /// Current placement.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// The placement a direct child of this folder must carry.
    pub fn child_placement(&self) -> Placement {
        Placement::inside(self.id, self.placement.parent_list())
    }

    /// Whether this folder is `other` or lies anywhere below it.
    pub fn is_within(&self, other: FolderId) -> bool {
        self.id == other || self.parent_list().contains(other)
    }

    /// Change the folder name.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    /// Move the folder itself to `placement`. Descendants are not touched.
    pub fn place(&mut self, placement: Placement) {
        self.placement = placement;
        self.updated_at = Utc::now();
    }

    /// Rebase this folder's ancestry below `anchor` onto `base`.
    ///
    /// Returns `false` (and leaves the record untouched) when `anchor` is not
    /// an ancestor or the list is already up to date.
    pub fn rebase(&mut self, anchor: FolderId, base: &ParentList) -> bool {
        match self.placement.rebased(anchor, base) {
            Some(rebased) if rebased != self.placement => {
                self.place(rebased);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_placement_extends_parent_list() {
        let owner = UserId::new();
        let top = Folder::new(owner, "top", Placement::root());
        let child = Folder::new(owner, "child", top.child_placement());

        assert!(top.is_top_level());
        assert_eq!(child.parent(), ParentRef::Folder(top.id));
        assert_eq!(child.parent_list(), &ParentList::root().extended(top.id));
        assert!(child.is_within(top.id));
        assert!(!top.is_within(child.id));
    }

    #[test]
    fn test_rebase_is_noop_when_current() {
        let owner = UserId::new();
        let top = Folder::new(owner, "top", Placement::root());
        let mut child = Folder::new(owner, "child", top.child_placement());
        let before = child.clone();

        assert!(!child.rebase(top.id, &ParentList::root()));
        assert_eq!(child, before);
    }

    #[test]
    fn test_serialized_shape() {
        let owner = UserId::new();
        let top = Folder::new(owner, "bunny", Placement::root());
        let json = serde_json::to_value(&top).expect("serialize");

        assert_eq!(json["parent"], "/");
        assert_eq!(json["parent_list"], serde_json::json!(["/"]));
        let back: Folder = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, top);
    }

    #[test]
    fn test_deserialize_rejects_self_contradicting_placement() {
        let owner = UserId::new();
        let top = Folder::new(owner, "top", Placement::root());
        let mut json = serde_json::to_value(&top).expect("serialize");
        json["parent"] = serde_json::json!(FolderId::new().to_string());

        assert!(serde_json::from_value::<Folder>(json).is_err());
    }
}
