//! REST client for the document store service.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::TaskDocument,
    error::ApiError,
    protocol::{
        CreateDocumentRequest, CreateDocumentResponse, DocumentSnapshot, UpdateDocumentRequest,
    },
};
use url::Url;

use crate::collection::DocumentCollection;

pub const DEFAULT_COLLECTION: &str = "tasks";

#[derive(Debug, Clone)]
pub struct HttpCollectionConfig {
    pub base_url: String,
    pub collection: String,
}

impl HttpCollectionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

pub struct HttpDocumentCollection {
    http: Client,
    documents_url: Url,
}

impl HttpDocumentCollection {
    pub fn new(config: HttpCollectionConfig) -> Result<Self> {
        let mut base = Url::parse(config.base_url.trim())
            .with_context(|| format!("invalid document store url '{}'", config.base_url))?;
        if config.collection.trim().is_empty() {
            return Err(anyhow!("collection name cannot be empty"));
        }

        base.path_segments_mut()
            .map_err(|_| anyhow!("document store url '{}' cannot be used as a base", config.base_url))?
            .pop_if_empty()
            .extend(["collections", config.collection.as_str(), "documents"]);

        Ok(Self {
            http: Client::new(),
            documents_url: base,
        })
    }

    fn document_url(&self, id: &str) -> Result<Url> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("document store url cannot be used as a base"))?
            .push(id);
        Ok(url)
    }
}

/// Turns a non-success response into an error carrying the store's message.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match response.json::<ApiError>().await {
        Ok(api_error) => Err(anyhow!(api_error.message)),
        Err(_) => Err(anyhow!("document store responded with {status}")),
    }
}

#[async_trait]
impl DocumentCollection for HttpDocumentCollection {
    async fn add(&self, document: TaskDocument) -> Result<String> {
        let response = self
            .http
            .post(self.documents_url.clone())
            .json(&CreateDocumentRequest { document })
            .send()
            .await?;
        let created: CreateDocumentResponse = ensure_success(response).await?.json().await?;
        Ok(created.id)
    }

    async fn list(&self) -> Result<Vec<DocumentSnapshot>> {
        let response = self.http.get(self.documents_url.clone()).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self.http.delete(self.document_url(id)?).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update(&self, id: &str, title: &str, body: &str) -> Result<()> {
        let response = self
            .http
            .patch(self.document_url(id)?)
            .json(&UpdateDocumentRequest {
                title: Some(title.to_string()),
                body: Some(body.to_string()),
            })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}
