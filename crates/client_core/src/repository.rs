use std::{future::Future, time::Duration};

use async_trait::async_trait;
use shared::{
    domain::{Task, TaskDocument, TaskId},
    protocol::DocumentSnapshot,
};
use tracing::{debug, warn};

use crate::{
    collection::DocumentCollection,
    dates::{convert_date_format, current_time_as_string},
    error::{FetchResult, RepositoryError},
};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Upper bound for a single remote call. No retry follows a timeout.
    pub call_timeout: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// The four remote operations the task screen depends on.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn add_task(&self, title: &str, body: &str) -> FetchResult<()>;
    async fn get_all_tasks(&self) -> FetchResult<Vec<Task>>;
    async fn delete_task(&self, task_id: &TaskId) -> FetchResult<()>;
    async fn update_task(&self, task_id: &TaskId, title: &str, body: &str) -> FetchResult<()>;
}

/// [`TaskRepository`] over any [`DocumentCollection`], bounding every call in
/// time and folding collaborator errors into [`RepositoryError`].
pub struct CollectionTaskRepository<C> {
    collection: C,
    config: RepositoryConfig,
}

impl<C: DocumentCollection> CollectionTaskRepository<C> {
    pub fn new(collection: C) -> Self {
        Self::with_config(collection, RepositoryConfig::default())
    }

    pub fn with_config(collection: C, config: RepositoryConfig) -> Self {
        Self { collection, config }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> FetchResult<T>
    where
        T: Send,
        F: Future<Output = anyhow::Result<T>> + Send,
    {
        // On elapse the call future is dropped, which cancels it as far as
        // the collection supports.
        match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(Ok(value)) => {
                debug!(operation, "task repository call succeeded");
                Ok(value)
            }
            Ok(Err(error)) => {
                warn!(operation, %error, "task repository call failed");
                Err(RepositoryError::remote(&error))
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout = ?self.config.call_timeout,
                    "task repository call timed out"
                );
                Err(RepositoryError::Timeout)
            }
        }
    }
}

fn task_from_snapshot(snapshot: DocumentSnapshot) -> Task {
    Task {
        task_id: TaskId(snapshot.id),
        title: snapshot.title.unwrap_or_default(),
        body: snapshot.body.unwrap_or_default(),
        created_at: convert_date_format(&snapshot.created_at.unwrap_or_default()),
    }
}

#[async_trait]
impl<C: DocumentCollection> TaskRepository for CollectionTaskRepository<C> {
    async fn add_task(&self, title: &str, body: &str) -> FetchResult<()> {
        let document = TaskDocument {
            title: title.to_string(),
            body: body.to_string(),
            created_at: current_time_as_string(),
        };
        self.guarded("add_task", async {
            self.collection.add(document).await.map(|_id| ())
        })
        .await
    }

    async fn get_all_tasks(&self) -> FetchResult<Vec<Task>> {
        self.guarded("get_all_tasks", async {
            let documents = self.collection.list().await?;
            Ok::<_, anyhow::Error>(documents.into_iter().map(task_from_snapshot).collect::<Vec<_>>())
        })
        .await
    }

    async fn delete_task(&self, task_id: &TaskId) -> FetchResult<()> {
        self.guarded("delete_task", self.collection.delete(task_id.as_str()))
            .await
    }

    async fn update_task(&self, task_id: &TaskId, title: &str, body: &str) -> FetchResult<()> {
        self.guarded(
            "update_task",
            self.collection.update(task_id.as_str(), title, body),
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/repository_tests.rs"]
mod tests;
