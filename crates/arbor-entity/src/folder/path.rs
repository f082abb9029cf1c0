//! Materialized path types.
//!
//! Every folder and file carries the ordered list of its ancestors, from the
//! root sentinel down to its immediate parent. These types only hand out
//! lists derived from an existing parent, so a path can never be assigned
//! independently of the hierarchy it describes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use thiserror::Error;

use arbor_core::types::FolderId;

/// Textual form of the root sentinel.
pub const ROOT_SENTINEL: &str = "/";

/// A value that is neither the root sentinel nor a folder identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid parent reference '{0}'")]
pub struct InvalidParentRef(pub String);

/// A stored placement whose parent is not the last entry of its list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parent '{parent}' does not match ancestor list {parent_list}")]
pub struct InconsistentPlacement {
    /// The recorded immediate parent.
    pub parent: ParentRef,
    /// The recorded ancestor list.
    pub parent_list: ParentList,
}

/// Reference to a parent: either the root sentinel or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ParentRef {
    /// Top-level placement.
    Root,
    /// Placement inside a folder.
    Folder(FolderId),
}

impl ParentRef {
    /// Check if this is the root sentinel.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// Return the folder ID, or `None` for the root sentinel.
    pub fn folder_id(&self) -> Option<FolderId> {
        match self {
            Self::Root => None,
            Self::Folder(id) => Some(*id),
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str(ROOT_SENTINEL),
            Self::Folder(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for ParentRef {
    type Err = InvalidParentRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == ROOT_SENTINEL {
            return Ok(Self::Root);
        }
        s.parse::<FolderId>()
            .map(Self::Folder)
            .map_err(|_| InvalidParentRef(s.to_string()))
    }
}

impl From<FolderId> for ParentRef {
    fn from(id: FolderId) -> Self {
        Self::Folder(id)
    }
}

impl From<ParentRef> for String {
    fn from(parent: ParentRef) -> String {
        parent.to_string()
    }
}

impl TryFrom<String> for ParentRef {
    type Error = InvalidParentRef;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl sqlx::Type<sqlx::Postgres> for ParentRef {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for ParentRef {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ParentRef {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <String as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}

/// Ordered ancestor list: root sentinel first, immediate parent last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<ParentRef>", try_from = "Vec<ParentRef>")]
pub struct ParentList(Vec<ParentRef>);

impl ParentList {
    /// The list carried by top-level nodes: just the root sentinel.
    pub fn root() -> Self {
        Self(vec![ParentRef::Root])
    }

    /// The list a direct child of `folder_id` carries, given that folder's own list.
    pub fn extended(&self, folder_id: FolderId) -> Self {
        let mut segments = self.0.clone();
        segments.push(ParentRef::Folder(folder_id));
        Self(segments)
    }

    /// Ancestors in order, root first.
    pub fn segments(&self) -> &[ParentRef] {
        &self.0
    }

    /// Number of ancestors including the root sentinel.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a list holds at least the root sentinel.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The immediate parent (last element).
    pub fn immediate_parent(&self) -> ParentRef {
        self.0.last().copied().unwrap_or(ParentRef::Root)
    }

    /// Whether `folder_id` is an ancestor.
    pub fn contains(&self, folder_id: FolderId) -> bool {
        self.position(folder_id).is_some()
    }

    /// Index of `folder_id` in the list.
    pub fn position(&self, folder_id: FolderId) -> Option<usize> {
        self.0
            .iter()
            .position(|segment| *segment == ParentRef::Folder(folder_id))
    }

    /// Whether the list begins with every element of `prefix`.
    pub fn starts_with(&self, prefix: &ParentList) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Replace everything before `anchor` with `base`, keeping `anchor` and
    /// the ancestry below it in place.
    ///
    /// `base` is the new list of `anchor` itself. Returns `None` when `anchor`
    /// is not an ancestor. Applying the same rebase twice yields the same list.
    pub fn rebased(&self, anchor: FolderId, base: &ParentList) -> Option<Self> {
        let position = self.position(anchor)?;
        let mut segments = Vec::with_capacity(base.len() + self.len() - position);
        segments.extend_from_slice(&base.0);
        segments.extend_from_slice(&self.0[position..]);
        Some(Self(segments))
    }

    /// Textual form of each segment.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl From<ParentList> for Vec<ParentRef> {
    fn from(list: ParentList) -> Self {
        list.0
    }
}

impl TryFrom<Vec<ParentRef>> for ParentList {
    type Error = InvalidParentRef;

    fn try_from(segments: Vec<ParentRef>) -> Result<Self, Self::Error> {
        match segments.split_first() {
            Some((ParentRef::Root, rest)) if rest.iter().all(|s| !s.is_root()) => {
                Ok(Self(segments))
            }
            _ => Err(InvalidParentRef(
                segments
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            )),
        }
    }
}

impl TryFrom<Vec<String>> for ParentList {
    type Error = InvalidParentRef;

    fn try_from(raw: Vec<String>) -> Result<Self, Self::Error> {
        let segments = raw
            .iter()
            .map(|s| s.parse::<ParentRef>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from(segments)
    }
}

impl fmt::Display for ParentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_strings().join(", "))
    }
}

impl sqlx::Type<sqlx::Postgres> for ParentList {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Vec<String> as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for ParentList {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Vec<String> as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.to_strings(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ParentList {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <Vec<String> as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(raw)?)
    }
}

/// Where a node sits: its immediate parent and full ancestor list.
///
/// Only obtainable for the root ([`Placement::root`]), under an existing
/// folder (`Folder::child_placement`), or by rebasing an existing placement,
/// which keeps `parent_list` consistent with `parent`. Decoded placements
/// are checked for the same agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PlacementRecord", try_from = "PlacementRecord")]
pub struct Placement {
    /// Immediate parent.
    parent: ParentRef,
    /// Ancestors from root to the immediate parent.
    parent_list: ParentList,
}

/// Unchecked wire form of [`Placement`].
#[derive(Serialize, Deserialize)]
struct PlacementRecord {
    parent: ParentRef,
    parent_list: ParentList,
}

impl From<Placement> for PlacementRecord {
    fn from(placement: Placement) -> Self {
        Self {
            parent: placement.parent,
            parent_list: placement.parent_list,
        }
    }
}

impl TryFrom<PlacementRecord> for Placement {
    type Error = InconsistentPlacement;

    fn try_from(record: PlacementRecord) -> Result<Self, Self::Error> {
        if record.parent_list.immediate_parent() != record.parent {
            return Err(InconsistentPlacement {
                parent: record.parent,
                parent_list: record.parent_list,
            });
        }
        Ok(Self {
            parent: record.parent,
            parent_list: record.parent_list,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Placement {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let record = PlacementRecord {
            parent: row.try_get("parent")?,
            parent_list: row.try_get("parent_list")?,
        };
        Self::try_from(record).map_err(|e| sqlx::Error::ColumnDecode {
            index: "parent".to_string(),
            source: Box::new(e),
        })
    }
}

impl Placement {
    /// Top-level placement.
    pub fn root() -> Self {
        Self {
            parent: ParentRef::Root,
            parent_list: ParentList::root(),
        }
    }

    /// Placement directly inside the folder whose own list is `folder_list`.
    pub(crate) fn inside(folder_id: FolderId, folder_list: &ParentList) -> Self {
        Self {
            parent: ParentRef::Folder(folder_id),
            parent_list: folder_list.extended(folder_id),
        }
    }

    /// Immediate parent.
    pub fn parent(&self) -> ParentRef {
        self.parent
    }

    /// Ancestor list.
    pub fn parent_list(&self) -> &ParentList {
        &self.parent_list
    }

    /// Rebase the ancestor list below `anchor` onto `base` (the new list of
    /// `anchor`). The immediate parent does not change.
    pub fn rebased(&self, anchor: FolderId, base: &ParentList) -> Option<Self> {
        self.parent_list.rebased(anchor, base).map(|parent_list| Self {
            parent: self.parent,
            parent_list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(ids: &[FolderId]) -> ParentList {
        ids.iter()
            .fold(ParentList::root(), |list, id| list.extended(*id))
    }

    #[test]
    fn test_parent_ref_parse() {
        assert_eq!("/".parse::<ParentRef>(), Ok(ParentRef::Root));
        let id = FolderId::new();
        assert_eq!(
            id.to_string().parse::<ParentRef>(),
            Ok(ParentRef::Folder(id))
        );
        assert!("1234".parse::<ParentRef>().is_err());
    }

    #[test]
    fn test_parent_list_serializes_as_strings() {
        let id = FolderId::new();
        let list = ParentList::root().extended(id);
        let json = serde_json::to_value(&list).expect("serialize");
        assert_eq!(json, serde_json::json!(["/", id.to_string()]));
    }

    #[test]
    fn test_parent_list_rejects_missing_root() {
        let id = FolderId::new();
        let bad: Result<ParentList, _> = serde_json::from_value(serde_json::json!([id.to_string()]));
        assert!(bad.is_err());
        let nested_root: Result<ParentList, _> =
            ParentList::try_from(vec!["/".to_string(), "/".to_string()]);
        assert!(nested_root.is_err());
    }

    #[test]
    fn test_rebased_keeps_anchor_and_below() {
        let (a, b, c, d) = (
            FolderId::new(),
            FolderId::new(),
            FolderId::new(),
            FolderId::new(),
        );
        // c's list under root -> a -> b
        let list = chain(&[a, b]);
        // a moves under d
        let moved = list.rebased(a, &chain(&[d])).expect("a is an ancestor");
        assert_eq!(moved, chain(&[d, a, b]));
        assert_eq!(moved.len(), 4);
        assert!(!moved.contains(c));
    }

    #[test]
    fn test_rebased_to_root_and_idempotent() {
        let (a, b) = (FolderId::new(), FolderId::new());
        let list = chain(&[a, b]);
        let base = ParentList::root();
        let once = list.rebased(b, &base).expect("b is an ancestor");
        assert_eq!(once, chain(&[b]));
        assert_eq!(once.rebased(b, &base), Some(once.clone()));
    }

    #[test]
    fn test_rebased_without_anchor() {
        let list = chain(&[FolderId::new()]);
        assert_eq!(list.rebased(FolderId::new(), &ParentList::root()), None);
    }

    #[test]
    fn test_placement_decoding_rejects_mismatched_parent() {
        let (a, b) = (FolderId::new(), FolderId::new());
        let bad: Result<Placement, _> = serde_json::from_value(serde_json::json!({
            "parent": b.to_string(),
            "parent_list": ["/", a.to_string()],
        }));
        assert!(bad.is_err());

        let top_with_list: Result<Placement, _> = serde_json::from_value(serde_json::json!({
            "parent": "/",
            "parent_list": ["/", a.to_string()],
        }));
        assert!(top_with_list.is_err());

        let good: Placement = serde_json::from_value(serde_json::json!({
            "parent": a.to_string(),
            "parent_list": ["/", a.to_string()],
        }))
        .expect("consistent placement");
        assert_eq!(good, Placement::inside(a, &ParentList::root()));
    }

    #[test]
    fn test_placement_inside_folder() {
        let a = FolderId::new();
        let placement = Placement::inside(a, &ParentList::root());
        assert_eq!(placement.parent(), ParentRef::Folder(a));
        assert_eq!(placement.parent_list().immediate_parent(), ParentRef::Folder(a));
        assert!(placement.parent_list().starts_with(&ParentList::root()));
    }
}
