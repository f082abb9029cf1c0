//! Folder listing options and results.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use arbor_core::types::{Pagination, SortDirection, UserId};

use super::model::Folder;
use super::path::ParentRef;

/// Sort order for folder lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderSort {
    /// Newest first.
    #[default]
    DateDesc,
    /// Oldest first.
    DateAsc,
    /// Alphabetical.
    NameAsc,
    /// Reverse alphabetical.
    NameDesc,
}

impl FolderSort {
    /// The column this order sorts on.
    pub fn column(&self) -> &'static str {
        match self {
            Self::DateDesc | Self::DateAsc => "created_at",
            Self::NameAsc | Self::NameDesc => "name",
        }
    }

    /// The direction of the sort.
    pub fn direction(&self) -> SortDirection {
        match self {
            Self::DateAsc | Self::NameAsc => SortDirection::Asc,
            Self::DateDesc | Self::NameDesc => SortDirection::Desc,
        }
    }

    /// Compare two folders in this order, breaking ties by id.
    pub fn compare(&self, a: &Folder, b: &Folder) -> Ordering {
        let primary = match self {
            Self::DateDesc | Self::DateAsc => a.created_at.cmp(&b.created_at),
            Self::NameAsc | Self::NameDesc => a.name.cmp(&b.name),
        };
        self.direction()
            .apply(primary.then_with(|| a.id.0.cmp(&b.id.0)))
    }
}

/// Caller-facing options for listing an owner's folders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderListQuery {
    /// Restrict to children of this parent (defaults to the root).
    #[serde(default)]
    pub parent: Option<ParentRef>,
    /// Case-insensitive substring to match against names. When set, the
    /// search spans the owner's whole tree and `parent` is ignored.
    #[serde(default)]
    pub search: Option<String>,
    /// Sort order.
    #[serde(default)]
    pub sort: FolderSort,
    /// Skip/limit window.
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl FolderListQuery {
    /// Resolve defaults into a store filter for `owner_id`.
    pub fn into_filter(self, owner_id: UserId) -> FolderFilter {
        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let parent = match search {
            Some(_) => None,
            None => Some(self.parent.unwrap_or(ParentRef::Root)),
        };

        FolderFilter {
            owner_id,
            parent,
            name_contains: search,
            sort: self.sort,
            pagination: self.pagination,
        }
    }
}

/// Fully resolved folder filter handed to the node store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderFilter {
    /// Only folders owned by this user.
    pub owner_id: UserId,
    /// Only direct children of this parent, when set.
    pub parent: Option<ParentRef>,
    /// Only names containing this text (case-insensitive), when set.
    pub name_contains: Option<String>,
    /// Sort order.
    pub sort: FolderSort,
    /// Skip/limit window.
    pub pagination: Pagination,
}

impl FolderFilter {
    /// Check whether a folder passes the owner, parent, and name restrictions.
    pub fn matches(&self, folder: &Folder) -> bool {
        if folder.owner_id != self.owner_id {
            return false;
        }
        if let Some(parent) = self.parent {
            if folder.parent() != parent {
                return false;
            }
        }
        match &self.name_contains {
            Some(needle) => folder
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

/// Paired name/id lists; `names[i]` labels `ids[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSublist {
    /// Display names.
    pub names: Vec<String>,
    /// Identifiers (the root sentinel appears as `"/"`).
    pub ids: Vec<ParentRef>,
}

impl FolderSublist {
    /// Append one entry to both lists.
    pub fn push(&mut self, name: impl Into<String>, id: ParentRef) {
        self.names.push(name.into());
        self.ids.push(id);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<Folder> for FolderSublist {
    fn from_iter<I: IntoIterator<Item = Folder>>(iter: I) -> Self {
        let mut list = Self::default();
        for folder in iter {
            list.push(folder.name, ParentRef::Folder(folder.id));
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::path::Placement;

    #[test]
    fn test_default_query_targets_top_level() {
        let owner = UserId::new();
        let filter = FolderListQuery::default().into_filter(owner);
        assert_eq!(filter.parent, Some(ParentRef::Root));
        assert_eq!(filter.name_contains, None);
        assert_eq!(filter.sort, FolderSort::DateDesc);
    }

    #[test]
    fn test_search_drops_parent() {
        let owner = UserId::new();
        let query = FolderListQuery {
            parent: Some(ParentRef::Root),
            search: Some("  Bun ".to_string()),
            ..Default::default()
        };
        let filter = query.into_filter(owner);
        assert_eq!(filter.parent, None);
        assert_eq!(filter.name_contains.as_deref(), Some("Bun"));

        let folder = Folder::new(owner, "bunny", Placement::root());
        assert!(filter.matches(&folder));
    }

    #[test]
    fn test_query_deserializes_flat_pagination() {
        let query: FolderListQuery =
            serde_json::from_str(r#"{"sort":"name_asc","skip":2,"limit":5}"#).expect("parse");
        assert_eq!(query.sort, FolderSort::NameAsc);
        assert_eq!(query.pagination, Pagination::new(2, Some(5)));
    }

    #[test]
    fn test_sort_breaks_ties_by_id() {
        let owner = UserId::new();
        let a = Folder::new(owner, "same", Placement::root());
        let mut b = Folder::new(owner, "same", Placement::root());
        b.created_at = a.created_at;
        let asc = FolderSort::NameAsc.compare(&a, &b);
        let desc = FolderSort::NameDesc.compare(&a, &b);
        assert_ne!(asc, Ordering::Equal);
        assert_eq!(asc, desc.reverse());
    }
}
