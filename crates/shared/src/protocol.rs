use serde::{Deserialize, Serialize};

use crate::domain::TaskDocument;

/// Body of `POST /collections/:collection/documents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    #[serde(flatten)]
    pub document: TaskDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentResponse {
    pub id: String,
}

/// Body of `PATCH /collections/:collection/documents/:id`. Absent fields stay untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// One entry of `GET /collections/:collection/documents`.
///
/// Fields are optional on the wire: older or hand-written documents may lack
/// any of them, and readers substitute their own defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
