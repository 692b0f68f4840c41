//! Read-only JSON HTTP server over the populated store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/users` | All users, in insertion order |
//! | `GET`  | `/api/carts` | All carts |
//! | `GET`  | `/api/products` | All products |
//! | `GET`  | `/api/products-bought-from-carts` | All cart line items |
//! | `GET`  | `/api/most-ordered-category` | Most-ordered categories per user |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "internal", "message": "querying category totals: ..." } }
//! ```
//!
//! Every failure is a store failure and maps to `500`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use shopsync_core::models::{Cart, CategoryRanking, LineItem, Product, User};
use shopsync_core::pipeline::Collection;
use shopsync_core::query::QueryService;

use crate::audit_file::FileAuditLog;
use crate::config::Config;
use crate::db;
use crate::ingest;
use crate::migrate;
use crate::sqlite_store::SqliteRepository;

/// Starts the HTTP server.
///
/// Unless `skip_ingest` is set, every pipeline runs first and the server is
/// only bound once all of them succeed. Runs until the process is terminated.
pub async fn run_server(config: &Config, skip_ingest: bool) -> anyhow::Result<()> {
    if !skip_ingest {
        ingest::run_ingest(config, &Collection::ALL).await?;
    }

    let pool = db::connect(&config.db).await?;
    migrate::migrate(&pool, false).await?;

    let queries = QueryService::new(
        Arc::new(SqliteRepository::new(pool)),
        Arc::new(FileAuditLog::new(&config.audit.dir)),
    );

    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("shopsync server listening on http://{}", bind_addr);
    tracing::info!(%bind_addr, "server started");

    axum::serve(listener, router(queries)).await?;
    Ok(())
}

/// Build the application router over a query service.
pub fn router(queries: QueryService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/users", get(handle_users))
        .route("/api/carts", get(handle_carts))
        .route("/api/products", get(handle_products))
        .route(
            "/api/products-bought-from-carts",
            get(handle_products_bought_from_carts),
        )
        .route("/api/most-ordered-category", get(handle_most_ordered_category))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(queries)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        tracing::error!(error = %message, "request failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message,
        }
    }
}

// ============ Collections ============

async fn handle_users(State(queries): State<QueryService>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(queries.list_users().await?))
}

async fn handle_carts(State(queries): State<QueryService>) -> Result<Json<Vec<Cart>>, AppError> {
    Ok(Json(queries.list_carts().await?))
}

async fn handle_products(
    State(queries): State<QueryService>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(queries.list_products().await?))
}

async fn handle_products_bought_from_carts(
    State(queries): State<QueryService>,
) -> Result<Json<Vec<LineItem>>, AppError> {
    Ok(Json(queries.list_line_items().await?))
}

/// Recomputes the aggregation on every request, appending to its audit log.
async fn handle_most_ordered_category(
    State(queries): State<QueryService>,
) -> Result<Json<Vec<CategoryRanking>>, AppError> {
    Ok(Json(queries.list_most_ordered_categories().await?))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
