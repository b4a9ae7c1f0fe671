use super::*;
use axum::{body, body::Body, http::Request};
use shared::domain::TaskDocument;
use tower::ServiceExt;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let api = ApiContext {
        storage: storage.clone(),
    };
    let app = build_router(Arc::new(AppState { api }));
    (app, storage)
}

fn json_request(method: &str, uri: &str, value: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(value.to_string()))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn add_then_list_returns_document_with_assigned_id() {
    let (app, _storage) = test_app().await;

    let add = json_request(
        "POST",
        "/collections/tasks/documents",
        serde_json::json!({
            "title": "Buy milk",
            "body": "2%",
            "createdAt": "2024-03-01 09:15:00",
        }),
    );
    let response = app.clone().oneshot(add).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: CreateDocumentResponse = read_json(response).await;
    assert!(!created.id.is_empty());

    let list = Request::get("/collections/tasks/documents")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(list).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let docs: Vec<DocumentSnapshot> = read_json(response).await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, created.id);
    assert_eq!(docs[0].title.as_deref(), Some("Buy milk"));
    assert_eq!(docs[0].body.as_deref(), Some("2%"));
    assert_eq!(docs[0].created_at.as_deref(), Some("2024-03-01 09:15:00"));
}

#[tokio::test]
async fn patch_updates_title_and_body_only() {
    let (app, storage) = test_app().await;
    let id = storage
        .add_document(
            "tasks",
            &TaskDocument {
                title: "old".into(),
                body: "old body".into(),
                created_at: "2024-03-01 09:15:00".into(),
            },
        )
        .await
        .expect("seed");

    let update = json_request(
        "PATCH",
        &format!("/collections/tasks/documents/{id}"),
        serde_json::json!({ "title": "new", "body": "new body" }),
    );
    let response = app.oneshot(update).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let doc = storage
        .load_document("tasks", &id)
        .await
        .expect("load")
        .expect("exists");
    assert_eq!(doc.title.as_deref(), Some("new"));
    assert_eq!(doc.body.as_deref(), Some("new body"));
    assert_eq!(doc.created_at.as_deref(), Some("2024-03-01 09:15:00"));
}

#[tokio::test]
async fn patch_of_unknown_document_is_not_found() {
    let (app, _storage) = test_app().await;
    let update = json_request(
        "PATCH",
        "/collections/tasks/documents/missing",
        serde_json::json!({ "title": "new" }),
    );
    let response = app.oneshot(update).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = read_json(response).await;
    assert!(matches!(err.code, ErrorCode::NotFound));
}

#[tokio::test]
async fn delete_removes_document_and_is_idempotent() {
    let (app, storage) = test_app().await;
    let id = storage
        .add_document("tasks", &TaskDocument::default())
        .await
        .expect("seed");

    for _ in 0..2 {
        let delete = Request::delete(format!("/collections/tasks/documents/{id}"))
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(delete).await.expect("response");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    assert!(storage.list_documents("tasks").await.expect("list").is_empty());
}

#[tokio::test]
async fn invalid_collection_name_is_bad_request() {
    let (app, _storage) = test_app().await;
    let list = Request::get("/collections/bad.name/documents")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(list).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
