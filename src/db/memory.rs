use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::db::models::{Document, DocumentId, DocumentPatch, DocumentQuery, NewDocument, SortOrder};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;

#[derive(Default)]
struct Collection {
    /// Kept in insertion order.
    documents: Vec<Document>,
    last_creation_time: i64,
}

/// In-process implementation of the DocumentRepository.
///
/// Every call takes the collection lock once, so a multi-document call
/// like `set_archived` is observed by readers either fully or not at all.
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    inner: RwLock<Collection>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully formed document as-is, bypassing id assignment.
    ///
    /// Lets tests seed states the public operations never produce, such
    /// as parent cycles.
    pub fn seed(&self, doc: Document) -> Result<(), AppError> {
        let mut collection = self.write()?;
        collection.last_creation_time = collection.last_creation_time.max(doc.creation_time);
        collection.documents.retain(|d| d.id != doc.id);
        collection.documents.push(doc);
        Ok(())
    }

    /// Number of stored documents, archived ones included.
    pub fn len(&self) -> usize {
        self.read().map(|c| c.documents.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collection>, AppError> {
        self.inner
            .read()
            .map_err(|_| AppError::Internal("document store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collection>, AppError> {
        self.inner
            .write()
            .map_err(|_| AppError::Internal("document store lock poisoned".into()))
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, AppError> {
        Ok(self
            .read()?
            .documents
            .iter()
            .find(|d| d.id == *id)
            .cloned())
    }

    async fn insert(&self, new_doc: NewDocument) -> Result<Document, AppError> {
        let mut collection = self.write()?;

        // Strictly increasing, even for inserts within the same microsecond
        let now = chrono::Utc::now().timestamp_micros();
        let creation_time = now.max(collection.last_creation_time + 1);
        collection.last_creation_time = creation_time;

        let doc = Document {
            id: DocumentId::generate(),
            creation_time,
            title: new_doc.title,
            content: None,
            cover_image: None,
            icon: None,
            owner_id: new_doc.owner_id,
            parent_id: new_doc.parent_id,
            is_archived: false,
            is_published: false,
        };
        collection.documents.push(doc.clone());
        Ok(doc)
    }

    async fn patch(&self, id: &DocumentId, patch: &DocumentPatch) -> Result<Document, AppError> {
        let mut collection = self.write()?;
        let doc = collection
            .documents
            .iter_mut()
            .find(|d| d.id == *id)
            .ok_or_else(|| AppError::NotFound(format!("Document {id}")))?;
        patch.apply_to(doc);
        Ok(doc.clone())
    }

    async fn set_archived(&self, ids: &[DocumentId], archived: bool) -> Result<u64, AppError> {
        let mut collection = self.write()?;
        let mut matched = 0;
        for doc in collection.documents.iter_mut() {
            if ids.contains(&doc.id) {
                doc.is_archived = archived;
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), AppError> {
        let mut collection = self.write()?;
        let before = collection.documents.len();
        collection.documents.retain(|d| d.id != *id);
        if collection.documents.len() == before {
            return Err(AppError::NotFound(format!("Document {id}")));
        }
        Ok(())
    }

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, AppError> {
        let collection = self.read()?;
        let mut documents: Vec<Document> = collection
            .documents
            .iter()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();
        documents.sort_by_key(|d| d.creation_time);
        if query.order == SortOrder::Descending {
            documents.reverse();
        }
        Ok(documents)
    }
}
