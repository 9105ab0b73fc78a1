use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque document identifier, assigned by the store at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A page in a user's document tree, as stored in the `documents` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    /// Insertion order marker (microseconds since the Unix epoch).
    pub creation_time: i64,
    pub title: String,
    /// Serialized rich content. Never interpreted here.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Subject of the identity that created the document.
    pub owner_id: String,
    /// Parent document. `None` for a root page.
    #[serde(default)]
    pub parent_id: Option<DocumentId>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_published: bool,
}

impl Document {
    /// Anyone may read a published, non-archived document.
    pub fn is_publicly_visible(&self) -> bool {
        self.is_published && !self.is_archived
    }

    pub fn is_owned_by(&self, subject: &str) -> bool {
        self.owner_id == subject
    }
}

/// Fields supplied when inserting a document; the store assigns
/// `id` and `creation_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub title: String,
    pub owner_id: String,
    pub parent_id: Option<DocumentId>,
}

/// Partial update merged into an existing record.
///
/// The outer `Option` says whether a field is touched. For nullable fields
/// the inner `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<Option<String>>,
    pub cover_image: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub is_published: Option<bool>,
    pub is_archived: Option<bool>,
    pub parent_id: Option<Option<DocumentId>>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the touched fields into `doc`.
    pub fn apply_to(&self, doc: &mut Document) {
        if let Some(title) = &self.title {
            doc.title = title.clone();
        }
        if let Some(content) = &self.content {
            doc.content = content.clone();
        }
        if let Some(cover_image) = &self.cover_image {
            doc.cover_image = cover_image.clone();
        }
        if let Some(icon) = &self.icon {
            doc.icon = icon.clone();
        }
        if let Some(is_published) = self.is_published {
            doc.is_published = is_published;
        }
        if let Some(is_archived) = self.is_archived {
            doc.is_archived = is_archived;
        }
        if let Some(parent_id) = &self.parent_id {
            doc.parent_id = parent_id.clone();
        }
    }
}

/// The equality indexes the store maintains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexScan {
    /// `by_owner`: all documents of one owner.
    ByOwner { owner_id: String },
    /// `by_owner_parent`: one tree level of one owner. `parent_id: None`
    /// selects root documents.
    ByOwnerParent {
        owner_id: String,
        parent_id: Option<DocumentId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// An index scan plus an optional post-scan filter on `is_archived`,
/// ordered by insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    pub scan: IndexScan,
    pub archived: Option<bool>,
    pub order: SortOrder,
}

impl DocumentQuery {
    pub fn by_owner(owner_id: impl Into<String>) -> Self {
        Self {
            scan: IndexScan::ByOwner {
                owner_id: owner_id.into(),
            },
            archived: None,
            order: SortOrder::Descending,
        }
    }

    pub fn children_of(owner_id: impl Into<String>, parent_id: Option<DocumentId>) -> Self {
        Self {
            scan: IndexScan::ByOwnerParent {
                owner_id: owner_id.into(),
                parent_id,
            },
            archived: None,
            order: SortOrder::Descending,
        }
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether `doc` satisfies both the index predicate and the filter.
    pub fn matches(&self, doc: &Document) -> bool {
        let in_scan = match &self.scan {
            IndexScan::ByOwner { owner_id } => doc.owner_id == *owner_id,
            IndexScan::ByOwnerParent {
                owner_id,
                parent_id,
            } => doc.owner_id == *owner_id && doc.parent_id == *parent_id,
        };
        in_scan && self.archived.map_or(true, |flag| doc.is_archived == flag)
    }
}
