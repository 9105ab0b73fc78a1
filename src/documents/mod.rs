//! Document lifecycle engine.
//!
//! All rules over the document tree live here: who may mutate a document,
//! how archive and restore cascade through a subtree, and which documents
//! each read-side projection returns. Functions take the store and the
//! caller's identity explicitly and keep no state between calls.

use crate::auth::models::Identity;
use crate::db::models::{Document, DocumentId};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;

pub mod cascade;
pub mod lifecycle;
pub mod options;
pub mod projections;

pub use lifecycle::{
    archive, create, remove, remove_cover_image, remove_icon, restore, update, CreateDocument,
    UpdateDocument,
};
pub use options::{LifecycleOptions, RemovePolicy};
pub use projections::{get_by_id, get_sidebar, get_trash, search};

/// Fail with `Unauthenticated` when there is no caller identity.
pub(crate) fn require_identity(caller: Option<&Identity>) -> Result<&Identity, AppError> {
    caller.ok_or_else(|| AppError::Unauthenticated("Not authenticated".into()))
}

/// Load a document the caller must own.
///
/// Checks run in order: identity, existence, ownership. Nothing is written.
pub(crate) async fn load_owned<'a>(
    repo: &dyn DocumentRepository,
    caller: Option<&'a Identity>,
    id: &DocumentId,
) -> Result<(&'a Identity, Document), AppError> {
    let identity = require_identity(caller)?;
    let doc = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id}")))?;

    if !doc.is_owned_by(&identity.subject) {
        return Err(AppError::Forbidden(format!(
            "Document {id} belongs to another user"
        )));
    }

    Ok((identity, doc))
}
