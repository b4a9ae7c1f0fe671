//! Document-collection clients: the remote store as seen by the repository.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{domain::TaskDocument, protocol::DocumentSnapshot};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A keyed collection of task documents. Errors are whatever the transport or
/// store raised; the repository decides how to present them.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Stores a new document and returns the identity the store assigned.
    async fn add(&self, document: TaskDocument) -> Result<String>;
    async fn list(&self) -> Result<Vec<DocumentSnapshot>>;
    async fn delete(&self, id: &str) -> Result<()>;
    /// Overwrites `title` and `body`; `createdAt` is left alone.
    async fn update(&self, id: &str, title: &str, body: &str) -> Result<()>;
}

/// Process-local collection. Useful offline and as a test double: it can be
/// told to fail or to stall every call.
#[derive(Default)]
pub struct InMemoryDocumentCollection {
    inner: Mutex<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    documents: Vec<DocumentSnapshot>,
    fail_with: Option<String>,
    latency: Option<Duration>,
}

impl InMemoryDocumentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            inner: Mutex::new(InMemoryState {
                latency: Some(latency),
                ..InMemoryState::default()
            }),
        }
    }

    /// Makes every subsequent call fail with `message`, or succeed again with `None`.
    pub async fn set_failure(&self, message: Option<String>) {
        self.inner.lock().await.fail_with = message;
    }

    /// Inserts a document verbatim, including missing fields.
    pub async fn insert_raw(&self, snapshot: DocumentSnapshot) {
        self.inner.lock().await.documents.push(snapshot);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn enter(&self) -> Result<()> {
        let (latency, failure) = {
            let guard = self.inner.lock().await;
            (guard.latency, guard.fail_with.clone())
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match failure {
            Some(message) => Err(anyhow!(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentCollection for InMemoryDocumentCollection {
    async fn add(&self, document: TaskDocument) -> Result<String> {
        self.enter().await?;
        let id = Uuid::new_v4().simple().to_string();
        self.inner.lock().await.documents.push(DocumentSnapshot {
            id: id.clone(),
            title: Some(document.title),
            body: Some(document.body),
            created_at: Some(document.created_at),
        });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<DocumentSnapshot>> {
        self.enter().await?;
        Ok(self.inner.lock().await.documents.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.enter().await?;
        self.inner.lock().await.documents.retain(|doc| doc.id != id);
        Ok(())
    }

    async fn update(&self, id: &str, title: &str, body: &str) -> Result<()> {
        self.enter().await?;
        let mut guard = self.inner.lock().await;
        let doc = guard
            .documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| anyhow!("no document '{id}' to update"))?;
        doc.title = Some(title.to_string());
        doc.body = Some(body.to_string());
        Ok(())
    }
}
