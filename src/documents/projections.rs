use crate::auth::models::Identity;
use crate::db::models::{Document, DocumentId, DocumentQuery};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;

use super::require_identity;

/// Fetch one document, enforcing read visibility.
///
/// Published, non-archived documents are readable by anyone, including
/// anonymous callers. Everything else is readable only by its owner.
pub async fn get_by_id(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    id: &DocumentId,
) -> Result<Document, AppError> {
    let doc = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id}")))?;

    if doc.is_publicly_visible() {
        return Ok(doc);
    }

    let identity = require_identity(caller)?;
    if !doc.is_owned_by(&identity.subject) {
        return Err(AppError::Forbidden(format!(
            "Document {id} belongs to another user"
        )));
    }

    Ok(doc)
}

/// One tree level of the caller's non-archived documents, newest first.
///
/// `parent_id: None` returns the root level.
pub async fn get_sidebar(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    parent_id: Option<DocumentId>,
) -> Result<Vec<Document>, AppError> {
    let identity = require_identity(caller)?;
    let query = DocumentQuery::children_of(identity.subject.as_str(), parent_id).archived(false);
    let documents = repo.query(&query).await?;
    tracing::debug!(count = documents.len(), "Sidebar level loaded");
    Ok(documents)
}

/// All of the caller's archived documents as a flat list, newest first.
pub async fn get_trash(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    title_filter: Option<&str>,
) -> Result<Vec<Document>, AppError> {
    let identity = require_identity(caller)?;
    let query = DocumentQuery::by_owner(identity.subject.as_str()).archived(true);
    let documents = filter_by_title(repo.query(&query).await?, title_filter);
    tracing::debug!(count = documents.len(), "Trash loaded");
    Ok(documents)
}

/// All of the caller's non-archived documents, newest first.
pub async fn search(
    repo: &dyn DocumentRepository,
    caller: Option<&Identity>,
    title_filter: Option<&str>,
) -> Result<Vec<Document>, AppError> {
    let identity = require_identity(caller)?;
    let query = DocumentQuery::by_owner(identity.subject.as_str()).archived(false);
    Ok(filter_by_title(repo.query(&query).await?, title_filter))
}

/// Keep documents whose title contains `needle`, ignoring case.
/// A missing or blank needle keeps everything.
fn filter_by_title(documents: Vec<Document>, needle: Option<&str>) -> Vec<Document> {
    let needle = match needle.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_lowercase(),
        _ => return documents,
    };
    documents
        .into_iter()
        .filter(|d| d.title.to_lowercase().contains(&needle))
        .collect()
}
