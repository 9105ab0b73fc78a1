use serde::{Deserialize, Serialize};

use crate::auth::models::Identity;
use crate::db::models::{Document, DocumentId, DocumentPatch, DocumentQuery, NewDocument};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;

use super::cascade::collect_subtree;
use super::options::{LifecycleOptions, RemovePolicy};
use super::{load_owned, require_identity};

/// Input of [`create`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<DocumentId>,
}

/// Input of [`update`]. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

impl From<UpdateDocument> for DocumentPatch {
    fn from(update: UpdateDocument) -> Self {
        DocumentPatch {
            title: update.title,
            content: update.content.map(Some),
            cover_image: update.cover_image.map(Some),
            icon: update.icon.map(Some),
            is_published: update.is_published,
            ..Default::default()
        }
    }
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".into()));
    }
    Ok(())
}

/// Create a root or nested document owned by the caller.
pub async fn create(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    input: CreateDocument,
    options: &LifecycleOptions,
) -> Result<Document, AppError> {
    let identity = require_identity(caller)?;
    validate_title(&input.title)?;

    if options.validate_parent {
        if let Some(parent_id) = &input.parent_id {
            load_owned(repo, caller, parent_id).await?;
        }
    }

    let doc = repo
        .insert(NewDocument {
            title: input.title,
            owner_id: identity.subject.clone(),
            parent_id: input.parent_id,
        })
        .await?;

    tracing::info!(id = %doc.id, parent = ?doc.parent_id, "Document created");
    Ok(doc)
}

/// Apply a partial field update to a document the caller owns.
pub async fn update(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    id: &DocumentId,
    input: UpdateDocument,
) -> Result<Document, AppError> {
    load_owned(repo, caller, id).await?;
    if let Some(title) = &input.title {
        validate_title(title)?;
    }

    let doc = repo.patch(id, &input.into()).await?;
    tracing::info!(id = %doc.id, "Document updated");
    Ok(doc)
}

/// Unset the document's icon.
pub async fn remove_icon(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    id: &DocumentId,
) -> Result<Document, AppError> {
    load_owned(repo, caller, id).await?;
    let patch = DocumentPatch {
        icon: Some(None),
        ..Default::default()
    };
    repo.patch(id, &patch).await
}

/// Unset the document's cover image.
pub async fn remove_cover_image(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    id: &DocumentId,
) -> Result<Document, AppError> {
    load_owned(repo, caller, id).await?;
    let patch = DocumentPatch {
        cover_image: Some(None),
        ..Default::default()
    };
    repo.patch(id, &patch).await
}

/// Set `is_archived` on the document and its whole subtree.
async fn set_archived_cascade(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    id: &DocumentId,
    archived: bool,
) -> Result<Document, AppError> {
    let (identity, _) = load_owned(repo, caller, id).await?;

    let subtree = collect_subtree(repo, &identity.subject, id).await?;
    let matched = repo.set_archived(&subtree, archived).await?;

    tracing::info!(
        id = %id,
        archived,
        subtree = subtree.len(),
        matched,
        "Archive flag cascaded"
    );

    repo.get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id}")))
}

/// Soft-delete the document and all of its descendants.
pub async fn archive(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    id: &DocumentId,
) -> Result<Document, AppError> {
    set_archived_cascade(repo, caller, id, true).await
}

/// Reverse [`archive`] for the document and all of its descendants.
///
/// The parent link is left alone, so a restored document may sit under a
/// still archived ancestor.
pub async fn restore(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    id: &DocumentId,
) -> Result<Document, AppError> {
    set_archived_cascade(repo, caller, id, false).await
}

/// Permanently delete a document; children are handled per `options`.
pub async fn remove(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    id: &DocumentId,
    options: &LifecycleOptions,
) -> Result<(), AppError> {
    let (identity, _) = load_owned(repo, caller, id).await?;
    let owner = identity.subject.as_str();

    match options.remove_policy {
        RemovePolicy::Orphan => {
            repo.delete(id).await?;
        }
        RemovePolicy::Cascade => {
            let subtree = collect_subtree(repo, owner, id).await?;
            // Descendants first: an interrupted call never leaves a child
            // whose parent is already gone.
            for doc_id in subtree.iter().rev() {
                repo.delete(doc_id).await?;
            }
            tracing::info!(id = %id, deleted = subtree.len(), "Document subtree removed");
            return Ok(());
        }
        RemovePolicy::Detach => {
            let children = repo
                .query(&DocumentQuery::children_of(owner, Some(id.clone())))
                .await?;
            let detach = DocumentPatch {
                parent_id: Some(None),
                ..Default::default()
            };
            for child in &children {
                repo.patch(&child.id, &detach).await?;
            }
            repo.delete(id).await?;
            tracing::info!(id = %id, detached = children.len(), "Document removed");
            return Ok(());
        }
        RemovePolicy::Reject => {
            let children = repo
                .query(&DocumentQuery::children_of(owner, Some(id.clone())))
                .await?;
            if !children.is_empty() {
                return Err(AppError::Conflict(format!(
                    "Document {id} still has {} child document(s)",
                    children.len()
                )));
            }
            repo.delete(id).await?;
        }
    }

    tracing::info!(id = %id, "Document removed");
    Ok(())
}
