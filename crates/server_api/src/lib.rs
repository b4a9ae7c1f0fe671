use shared::{
    domain::TaskDocument,
    error::{ApiError, ErrorCode},
    protocol::{DocumentSnapshot, UpdateDocumentRequest},
};
use storage::{Storage, StoredDocument};
use tracing::debug;

const MAX_COLLECTION_NAME_BYTES: usize = 64;
const MAX_FIELD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn add_document(
    ctx: &ApiContext,
    collection: &str,
    document: TaskDocument,
) -> Result<String, ApiError> {
    validate_collection(collection)?;
    validate_field("title", &document.title)?;
    validate_field("body", &document.body)?;
    validate_field("createdAt", &document.created_at)?;

    let id = ctx
        .storage
        .add_document(collection, &document)
        .await
        .map_err(internal)?;
    debug!(collection, %id, "document added");
    Ok(id)
}

pub async fn list_documents(
    ctx: &ApiContext,
    collection: &str,
) -> Result<Vec<DocumentSnapshot>, ApiError> {
    validate_collection(collection)?;
    let documents = ctx
        .storage
        .list_documents(collection)
        .await
        .map_err(internal)?;
    Ok(documents.into_iter().map(snapshot).collect())
}

/// Deleting an unknown id is not an error.
pub async fn delete_document(ctx: &ApiContext, collection: &str, id: &str) -> Result<(), ApiError> {
    validate_collection(collection)?;
    let removed = ctx
        .storage
        .delete_document(collection, id)
        .await
        .map_err(internal)?;
    debug!(collection, id, removed, "document delete");
    Ok(())
}

pub async fn update_document(
    ctx: &ApiContext,
    collection: &str,
    id: &str,
    request: UpdateDocumentRequest,
) -> Result<(), ApiError> {
    validate_collection(collection)?;
    if let Some(title) = &request.title {
        validate_field("title", title)?;
    }
    if let Some(body) = &request.body {
        validate_field("body", body)?;
    }

    let updated = ctx
        .storage
        .update_fields(
            collection,
            id,
            request.title.as_deref(),
            request.body.as_deref(),
        )
        .await
        .map_err(internal)?;
    if !updated {
        return Err(ApiError::not_found(format!(
            "no document '{id}' in collection '{collection}'"
        )));
    }
    Ok(())
}

pub fn validate_collection(collection: &str) -> Result<(), ApiError> {
    if collection.is_empty() {
        return Err(ApiError::validation("collection name cannot be empty"));
    }
    if collection.len() > MAX_COLLECTION_NAME_BYTES {
        return Err(ApiError::validation(format!(
            "collection name exceeds {MAX_COLLECTION_NAME_BYTES} bytes"
        )));
    }
    if !collection
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::validation(format!(
            "collection name '{collection}' contains invalid characters"
        )));
    }
    Ok(())
}

fn validate_field(name: &str, value: &str) -> Result<(), ApiError> {
    if value.len() > MAX_FIELD_BYTES {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("{name} exceeds {MAX_FIELD_BYTES} bytes"),
        ));
    }
    Ok(())
}

fn snapshot(document: StoredDocument) -> DocumentSnapshot {
    DocumentSnapshot {
        id: document.id,
        title: document.title,
        body: document.body,
        created_at: document.created_at,
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
