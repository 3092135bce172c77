use crate::query::QueryService;
use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Every unknown route, and every method other than POST on `/county_data`.
async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "detail": "Not Found" })),
    )
        .into_response()
}

/// POST /county_data. The raw body is handed to the service so malformed
/// JSON is classified there rather than by an extractor.
async fn county_data(Extension(service): Extension<Arc<QueryService>>, body: Bytes) -> Response {
    match tokio::task::spawn_blocking(move || service.lookup(&body)).await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            error!(error = %e, "lookup task failed");
            not_found().await
        }
    }
}

/// Create the HTTP router for `service`.
pub fn create_server(service: QueryService, request_timeout: Duration) -> Router {
    Router::new()
        .route("/county_data", post(county_data).fallback(not_found))
        .fallback(not_found)
        .layer(Extension(Arc::new(service)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

/// Start the HTTP server on `addr`.
pub async fn start_server(
    service: QueryService,
    addr: SocketAddr,
    request_timeout: Duration,
) -> anyhow::Result<()> {
    let app = create_server(service, request_timeout);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "county health API listening");
    println!("🚀 HTTP server running on http://{addr}");
    println!("🔎 Lookup:  POST http://{addr}/county_data");

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
