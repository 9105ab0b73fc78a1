use async_trait::async_trait;

use crate::db::models::{Document, DocumentId, DocumentPatch, DocumentQuery, NewDocument};
use crate::error::AppError;

/// Repository trait for the `documents` collection.
///
/// Every method is one store call with the store's own atomicity. This
/// trait allows swapping the database layer in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Point lookup by id.
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, AppError>;

    /// Insert a new, non-archived, unpublished document and return it
    /// with its assigned id and creation time.
    async fn insert(&self, doc: NewDocument) -> Result<Document, AppError>;

    /// Merge `patch` into an existing document and return the result.
    ///
    /// Fails with `NotFound` if the document does not exist.
    async fn patch(&self, id: &DocumentId, patch: &DocumentPatch) -> Result<Document, AppError>;

    /// Set `is_archived` on every listed document in one call.
    ///
    /// Returns how many of the ids matched a stored document.
    async fn set_archived(&self, ids: &[DocumentId], archived: bool) -> Result<u64, AppError>;

    /// Delete a single document. Fails with `NotFound` if it does not exist.
    async fn delete(&self, id: &DocumentId) -> Result<(), AppError>;

    /// Equality-index scan with optional archived filter, ordered by
    /// insertion.
    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, AppError>;
}

/// MongoDB implementation of the DocumentRepository.
///
/// This is only available when the `server` feature is enabled.
#[cfg(feature = "server")]
pub struct MongoDocumentRepository {
    collection: mongodb::Collection<Document>,
}

#[cfg(feature = "server")]
impl MongoDocumentRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("documents"),
        }
    }

    /// Create the `by_owner` and `by_owner_parent` indexes.
    ///
    /// Idempotent; call once on startup.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let by_owner = IndexModel::builder()
            .keys(doc! { "owner_id": 1 })
            .options(IndexOptions::builder().name("by_owner".to_string()).build())
            .build();
        let by_owner_parent = IndexModel::builder()
            .keys(doc! { "owner_id": 1, "parent_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("by_owner_parent".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes(vec![by_owner, by_owner_parent])
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Translate a patch into a `$set` document. Cleared fields become `null`.
#[cfg(feature = "server")]
fn patch_to_set(patch: &DocumentPatch) -> bson::Document {
    let mut set = bson::Document::new();
    if let Some(title) = &patch.title {
        set.insert("title", title.clone());
    }
    if let Some(content) = &patch.content {
        set.insert("content", content.clone());
    }
    if let Some(cover_image) = &patch.cover_image {
        set.insert("cover_image", cover_image.clone());
    }
    if let Some(icon) = &patch.icon {
        set.insert("icon", icon.clone());
    }
    if let Some(is_published) = patch.is_published {
        set.insert("is_published", is_published);
    }
    if let Some(is_archived) = patch.is_archived {
        set.insert("is_archived", is_archived);
    }
    if let Some(parent_id) = &patch.parent_id {
        set.insert(
            "parent_id",
            parent_id.as_ref().map(|p| p.as_str().to_string()),
        );
    }
    set
}

#[cfg(feature = "server")]
fn query_to_filter(query: &DocumentQuery) -> bson::Document {
    use crate::db::models::IndexScan;
    use mongodb::bson::doc;

    let mut filter = match &query.scan {
        IndexScan::ByOwner { owner_id } => doc! { "owner_id": owner_id },
        IndexScan::ByOwnerParent {
            owner_id,
            parent_id,
        } => doc! {
            "owner_id": owner_id,
            "parent_id": parent_id.as_ref().map(|p| p.as_str().to_string()),
        },
    };
    if let Some(archived) = query.archived {
        filter.insert("is_archived", archived);
    }
    filter
}

#[cfg(feature = "server")]
#[async_trait]
impl DocumentRepository for MongoDocumentRepository {
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": id.as_str() })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn insert(&self, new_doc: NewDocument) -> Result<Document, AppError> {
        let doc = Document {
            id: DocumentId::generate(),
            creation_time: chrono::Utc::now().timestamp_micros(),
            title: new_doc.title,
            content: None,
            cover_image: None,
            icon: None,
            owner_id: new_doc.owner_id,
            parent_id: new_doc.parent_id,
            is_archived: false,
            is_published: false,
        };

        self.collection
            .insert_one(&doc)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(doc)
    }

    async fn patch(&self, id: &DocumentId, patch: &DocumentPatch) -> Result<Document, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        if patch.is_empty() {
            return self
                .get(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Document {id}")));
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id.as_str() }, doc! { "$set": patch_to_set(patch) })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Document {id}")))
    }

    async fn set_archived(&self, ids: &[DocumentId], archived: bool) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        if ids.is_empty() {
            return Ok(0);
        }

        let raw_ids: Vec<&str> = ids.iter().map(DocumentId::as_str).collect();
        let result = self
            .collection
            .update_many(
                doc! { "_id": { "$in": raw_ids } },
                doc! { "$set": { "is_archived": archived } },
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.matched_count)
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .delete_one(doc! { "_id": id.as_str() })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Document {id}")));
        }
        Ok(())
    }

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, AppError> {
        use crate::db::models::SortOrder;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let direction = match query.order {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        };
        // Same-microsecond inserts fall back to _id
        let options = FindOptions::builder()
            .sort(doc! { "creation_time": direction, "_id": direction })
            .build();

        let mut cursor = self
            .collection
            .find(query_to_filter(query))
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut documents = Vec::new();
        use futures::TryStreamExt;
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            documents.push(doc);
        }

        Ok(documents)
    }
}
