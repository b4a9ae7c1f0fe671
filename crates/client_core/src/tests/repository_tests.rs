use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use parking_lot::Mutex;
use shared::{
    error::ApiError,
    protocol::{CreateDocumentRequest, CreateDocumentResponse, UpdateDocumentRequest},
};

use crate::{
    collection::InMemoryDocumentCollection,
    error::PLEASE_CHECK_INTERNET_CONNECTION,
    http::{HttpCollectionConfig, HttpDocumentCollection},
};

#[tokio::test]
async fn added_task_is_listed_with_fresh_id_and_display_date() {
    let repository = CollectionTaskRepository::new(InMemoryDocumentCollection::new());

    repository.add_task("Buy milk", "2%").await.expect("add");
    let tasks = repository.get_all_tasks().await.expect("list");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Buy milk");
    assert_eq!(tasks[0].body, "2%");
    assert!(!tasks[0].task_id.is_empty());
    // "%d %b %Y, %H:%M", e.g. "01 Mar 2024, 09:15"
    assert_eq!(tasks[0].created_at.len(), 18);
    assert_eq!(&tasks[0].created_at[11..13], ", ");
}

#[tokio::test]
async fn missing_fields_default_to_empty_strings() {
    let collection = InMemoryDocumentCollection::new();
    collection
        .insert_raw(DocumentSnapshot {
            id: "bare".into(),
            title: None,
            body: None,
            created_at: None,
        })
        .await;
    let repository = CollectionTaskRepository::new(collection);

    let tasks = repository.get_all_tasks().await.expect("list");
    assert_eq!(
        tasks,
        vec![Task {
            task_id: TaskId::new("bare"),
            title: String::new(),
            body: String::new(),
            created_at: String::new(),
        }]
    );
}

#[tokio::test]
async fn update_overwrites_text_and_keeps_creation_time() {
    let collection = InMemoryDocumentCollection::new();
    collection
        .insert_raw(DocumentSnapshot {
            id: "t-1".into(),
            title: Some("old".into()),
            body: Some("old body".into()),
            created_at: Some("2024-03-01 09:15:00".into()),
        })
        .await;
    let repository = CollectionTaskRepository::new(collection);

    repository
        .update_task(&TaskId::new("t-1"), "new", "")
        .await
        .expect("update");
    let tasks = repository.get_all_tasks().await.expect("list");

    assert_eq!(tasks[0].title, "new");
    assert_eq!(tasks[0].body, "");
    assert_eq!(tasks[0].created_at, "01 Mar 2024, 09:15");
}

#[tokio::test]
async fn delete_removes_only_the_target() {
    let collection = InMemoryDocumentCollection::new();
    for id in ["a", "b"] {
        collection
            .insert_raw(DocumentSnapshot {
                id: id.into(),
                title: Some(id.into()),
                body: None,
                created_at: None,
            })
            .await;
    }
    let repository = CollectionTaskRepository::new(collection);

    repository.delete_task(&TaskId::new("a")).await.expect("delete");
    let ids: Vec<_> = repository
        .get_all_tasks()
        .await
        .expect("list")
        .into_iter()
        .map(|task| task.task_id)
        .collect();
    assert_eq!(ids, vec![TaskId::new("b")]);
    assert_eq!(repository.collection().len().await, 1);
}

#[tokio::test]
async fn collaborator_errors_become_remote_failures() {
    let collection = InMemoryDocumentCollection::new();
    collection.set_failure(Some("network down".into())).await;
    let repository = CollectionTaskRepository::new(collection);

    let error = repository
        .delete_task(&TaskId::new("abc123"))
        .await
        .expect_err("delete should fail");
    assert_eq!(
        error,
        RepositoryError::Remote {
            message: Some("network down".into())
        }
    );
}

#[tokio::test(start_paused = true)]
async fn stalled_call_times_out_after_ten_seconds() {
    let repository = CollectionTaskRepository::new(InMemoryDocumentCollection::with_latency(
        Duration::from_secs(30),
    ));
    let started = tokio::time::Instant::now();

    let error = repository.get_all_tasks().await.expect_err("timeout");

    assert_eq!(error, RepositoryError::Timeout);
    assert_eq!(error.message(), Some(PLEASE_CHECK_INTERNET_CONNECTION));
    assert!(started.elapsed() >= DEFAULT_CALL_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn call_finishing_inside_the_bound_succeeds() {
    let repository = CollectionTaskRepository::with_config(
        InMemoryDocumentCollection::with_latency(Duration::from_secs(9)),
        RepositoryConfig::default(),
    );
    assert!(repository.add_task("slow", "but fine").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn custom_timeout_is_honoured() {
    let repository = CollectionTaskRepository::with_config(
        InMemoryDocumentCollection::with_latency(Duration::from_secs(2)),
        RepositoryConfig {
            call_timeout: Duration::from_secs(1),
        },
    );
    assert_eq!(
        repository.add_task("t", "b").await,
        Err(RepositoryError::Timeout)
    );
}

type Documents = Arc<Mutex<Vec<DocumentSnapshot>>>;

/// Minimal document store speaking the same routes as the server binary.
async fn spawn_fake_store() -> (String, Documents) {
    let documents: Documents = Arc::default();
    let app = Router::new()
        .route(
            "/collections/:collection/documents",
            get(list_route).post(add_route),
        )
        .route(
            "/collections/:collection/documents/:id",
            patch(update_route).delete(delete_route),
        )
        .with_state(Arc::clone(&documents));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), documents)
}

async fn list_route(State(documents): State<Documents>) -> Json<Vec<DocumentSnapshot>> {
    Json(documents.lock().clone())
}

async fn add_route(
    State(documents): State<Documents>,
    Json(req): Json<CreateDocumentRequest>,
) -> (StatusCode, Json<CreateDocumentResponse>) {
    let mut documents = documents.lock();
    let id = format!("doc-{}", documents.len() + 1);
    documents.push(DocumentSnapshot {
        id: id.clone(),
        title: Some(req.document.title),
        body: Some(req.document.body),
        created_at: Some(req.document.created_at),
    });
    (StatusCode::CREATED, Json(CreateDocumentResponse { id }))
}

async fn delete_route(
    State(documents): State<Documents>,
    Path((_collection, id)): Path<(String, String)>,
) -> StatusCode {
    documents.lock().retain(|doc| doc.id != id);
    StatusCode::NO_CONTENT
}

async fn update_route(
    State(documents): State<Documents>,
    Path((_collection, id)): Path<(String, String)>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let mut documents = documents.lock();
    let Some(doc) = documents.iter_mut().find(|doc| doc.id == id) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("document '{id}' does not exist"))),
        ));
    };
    if req.title.is_some() {
        doc.title = req.title;
    }
    if req.body.is_some() {
        doc.body = req.body;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[tokio::test]
async fn http_collection_round_trips_through_the_store_routes() {
    let (base_url, documents) = spawn_fake_store().await;
    let collection =
        HttpDocumentCollection::new(HttpCollectionConfig::new(base_url)).expect("collection");
    let repository = CollectionTaskRepository::new(collection);

    repository.add_task("Buy milk", "2%").await.expect("add");
    let tasks = repository.get_all_tasks().await.expect("list");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_id, TaskId::new("doc-1"));
    assert_eq!(tasks[0].title, "Buy milk");

    repository
        .update_task(&tasks[0].task_id, "Buy oat milk", "")
        .await
        .expect("update");
    let stored = documents.lock()[0].clone();
    assert_eq!(stored.title.as_deref(), Some("Buy oat milk"));
    assert_eq!(stored.body.as_deref(), Some(""));

    repository
        .delete_task(&tasks[0].task_id)
        .await
        .expect("delete");
    assert!(repository.get_all_tasks().await.expect("list").is_empty());
}

#[tokio::test]
async fn http_error_body_message_reaches_the_caller() {
    let (base_url, _documents) = spawn_fake_store().await;
    let collection =
        HttpDocumentCollection::new(HttpCollectionConfig::new(base_url)).expect("collection");
    let repository = CollectionTaskRepository::new(collection);

    let error = repository
        .update_task(&TaskId::new("ghost"), "t", "b")
        .await
        .expect_err("missing document");
    assert_eq!(error.message(), Some("document 'ghost' does not exist"));
}
