//! Axum server wiring for gatewise.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::QueryHandler;

/// Built-in landing page, used when no static directory is configured.
const LANDING_PAGE: &str = include_str!("landing.html");

/// Shared state for all API handlers.
pub struct AppState {
    /// The query handler behind `POST /api`.
    pub handler: QueryHandler,
}

impl AppState {
    pub fn new(handler: QueryHandler) -> Self {
        Self { handler }
    }
}

/// GET / — minimal built-in landing page.
async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// Build the axum router with all routes.
///
/// CORS is wide-open: the endpoint serves anonymous browser clients from
/// arbitrary origins.
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let shared_state = Arc::new(state);

    let router = Router::new()
        .route("/api", post(super::routes::ask::ask))
        .route("/api/health", get(super::routes::health::get_health))
        // Body size limit: 1 MiB. Queries are short free text; reject
        // oversized payloads before they reach the handler.
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    if let Some(dir) = static_dir {
        router.fallback_service(tower_http::services::ServeDir::new(dir))
    } else {
        router.route("/", get(landing))
    }
}

/// Bind and serve until the process is stopped.
pub async fn start_server(
    bind: &str,
    port: u16,
    state: AppState,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state, static_dir);
    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("gatewise listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
pub mod test_support {
    //! Shared fixtures for route tests.

    use std::sync::Arc;
    use std::time::Duration;

    use super::AppState;
    use crate::cache::JsonFileStore;
    use crate::fallback::FallbackTable;
    use crate::handler::QueryHandler;
    use crate::throttle::RequestGate;

    /// State with no provider configured: every request takes the fallback
    /// path. The backing temp dir is leaked for the test's lifetime.
    pub fn fallback_only_state() -> Arc<AppState> {
        Arc::new(AppState::new(fallback_only_handler()))
    }

    pub fn fallback_only_handler() -> QueryHandler {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = JsonFileStore::open(tmp.path().join("answers.json"));
        std::mem::forget(tmp);
        QueryHandler::new(
            None,
            Box::new(store),
            FallbackTable::default(),
            RequestGate::new(Duration::from_millis(0)),
        )
    }
}
