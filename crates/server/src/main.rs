use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use server_api::{add_document, delete_document, list_documents, update_document, ApiContext};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        CreateDocumentRequest, CreateDocumentResponse, DocumentSnapshot, UpdateDocumentRequest,
    },
};
use storage::Storage;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, resolve_database_url};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = resolve_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state))
        .layer(DefaultBodyLimit::max(settings.max_request_bytes));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "document store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("document store stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to install ctrl-c handler");
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/collections/:collection/documents",
            get(http_list_documents).post(http_add_document),
        )
        .route(
            "/collections/:collection/documents/:id",
            patch(http_update_document).delete(http_delete_document),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| reject(ApiError::new(ErrorCode::Internal, e.to_string())))?;
    Ok("ok")
}

async fn http_add_document(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Json(req): Json<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<CreateDocumentResponse>)> {
    let id = add_document(&state.api, &collection, req.document)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(CreateDocumentResponse { id })))
}

async fn http_list_documents(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
) -> ApiResult<Json<Vec<DocumentSnapshot>>> {
    let documents = list_documents(&state.api, &collection)
        .await
        .map_err(reject)?;
    Ok(Json(documents))
}

async fn http_delete_document(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    delete_document(&state.api, &collection, &id)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_update_document(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(req): Json<UpdateDocumentRequest>,
) -> ApiResult<StatusCode> {
    update_document(&state.api, &collection, &id, req)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(message = %err.message, "request failed");
    }
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
