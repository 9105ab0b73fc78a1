use serde::{Deserialize, Serialize};

/// What `remove` does with the children of the deleted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovePolicy {
    /// Delete only the target; children keep a dangling `parent_id`.
    #[default]
    Orphan,
    /// Delete the whole subtree.
    Cascade,
    /// Turn the direct children into root documents.
    Detach,
    /// Refuse to delete a document that still has children.
    Reject,
}

/// Tunables of the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifecycleOptions {
    #[serde(default)]
    pub remove_policy: RemovePolicy,
    /// Require `create`'s parent to exist and belong to the caller.
    #[serde(default)]
    pub validate_parent: bool,
}
