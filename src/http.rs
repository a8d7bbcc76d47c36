//! HTTP surface: `POST /{operation}` with a JSON body.
//!
//! Thin over [`router::dispatch`](crate::router::dispatch); CORS is open to any origin
//! for `POST` and `OPTIONS` with a `Content-Type` header. Bodies are not size-limited
//! here since the embedder truncates its input. Other methods on an operation route get
//! the same JSON `not_found` as unknown paths.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::error::MemoryError;
use crate::router::dispatch;
use crate::service::MemoryService;

/// Build the application router over a shared service.
pub fn router(service: Arc<MemoryService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/{operation}", post(handle_operation).fallback(not_found))
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .with_state(service)
}

async fn handle_operation(
    State(service): State<Arc<MemoryService>>,
    Path(operation): Path<String>,
    body: Bytes,
) -> Response {
    let reply = dispatch(&service, &operation, &body).await;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body)).into_response()
}

async fn not_found() -> Response {
    let err = MemoryError::NotFound("not found".into());
    (StatusCode::NOT_FOUND, Json(err.to_payload())).into_response()
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    service: Arc<MemoryService>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}
