use std::collections::HashSet;

use crate::db::models::{DocumentId, DocumentQuery};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;

/// Collect `root` and every transitive descendant owned by `owner_id`.
///
/// Children are found through the `(owner_id, parent_id)` index, one level
/// per store query. The result is in pre-order: each id appears after its
/// parent. Ids already collected are skipped, so a cyclic parent chain
/// terminates instead of looping.
pub async fn collect_subtree(
    repo: &dyn DocumentRepository,
    owner_id: &str,
    root: &DocumentId,
) -> Result<Vec<DocumentId>, AppError> {
    let mut visited: HashSet<DocumentId> = HashSet::new();
    visited.insert(root.clone());

    let mut collected = vec![root.clone()];
    let mut worklist = vec![root.clone()];

    while let Some(parent) = worklist.pop() {
        let children = repo
            .query(&DocumentQuery::children_of(owner_id, Some(parent.clone())))
            .await?;

        for child in children {
            if !visited.insert(child.id.clone()) {
                tracing::warn!(
                    parent = %parent,
                    child = %child.id,
                    "Parent chain loops back to an already visited document; skipping"
                );
                continue;
            }
            collected.push(child.id.clone());
            worklist.push(child.id);
        }
    }

    Ok(collected)
}
