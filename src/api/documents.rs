//! HTTP handlers for the document API. Each handler resolves the caller
//! and delegates to one lifecycle engine operation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::provider::Caller;
use crate::db::models::{Document, DocumentId};
use crate::documents::{self, CreateDocument, UpdateDocument};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SidebarQuery {
    #[serde(default)]
    pub parent_id: Option<DocumentId>,
}

#[derive(Debug, Deserialize)]
pub struct TitleFilterQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// `POST /api/v1/documents`
pub async fn create_handler(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateDocument>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let doc = documents::create(
        state.document_repo.as_ref(),
        caller.identity(),
        request,
        &state.lifecycle,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// `GET /api/v1/documents/sidebar?parent_id=`
pub async fn sidebar_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<SidebarQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let docs = documents::get_sidebar(
        state.document_repo.as_ref(),
        caller.identity(),
        params.parent_id,
    )
    .await?;
    Ok(Json(docs))
}

/// `GET /api/v1/documents/trash?q=`
pub async fn trash_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<TitleFilterQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let docs = documents::get_trash(
        state.document_repo.as_ref(),
        caller.identity(),
        params.q.as_deref(),
    )
    .await?;
    Ok(Json(docs))
}

/// `GET /api/v1/documents/search?q=`
pub async fn search_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<TitleFilterQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let docs = documents::search(
        state.document_repo.as_ref(),
        caller.identity(),
        params.q.as_deref(),
    )
    .await?;
    Ok(Json(docs))
}

/// `GET /api/v1/documents/{id}`
pub async fn get_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>, AppError> {
    let doc = documents::get_by_id(state.document_repo.as_ref(), caller.identity(), &id).await?;
    Ok(Json(doc))
}

/// `PATCH /api/v1/documents/{id}`
pub async fn update_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<DocumentId>,
    Json(request): Json<UpdateDocument>,
) -> Result<Json<Document>, AppError> {
    let doc = documents::update(
        state.document_repo.as_ref(),
        caller.identity(),
        &id,
        request,
    )
    .await?;
    Ok(Json(doc))
}

/// `POST /api/v1/documents/{id}/archive`
pub async fn archive_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>, AppError> {
    let doc = documents::archive(state.document_repo.as_ref(), caller.identity(), &id).await?;
    Ok(Json(doc))
}

/// `POST /api/v1/documents/{id}/restore`
pub async fn restore_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>, AppError> {
    let doc = documents::restore(state.document_repo.as_ref(), caller.identity(), &id).await?;
    Ok(Json(doc))
}

/// `DELETE /api/v1/documents/{id}`
pub async fn remove_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<DocumentId>,
) -> Result<StatusCode, AppError> {
    documents::remove(
        state.document_repo.as_ref(),
        caller.identity(),
        &id,
        &state.lifecycle,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/documents/{id}/icon`
pub async fn remove_icon_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>, AppError> {
    let doc =
        documents::remove_icon(state.document_repo.as_ref(), caller.identity(), &id).await?;
    Ok(Json(doc))
}

/// `DELETE /api/v1/documents/{id}/cover-image`
pub async fn remove_cover_image_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>, AppError> {
    let doc = documents::remove_cover_image(state.document_repo.as_ref(), caller.identity(), &id)
        .await?;
    Ok(Json(doc))
}
