//! LabDesk Web Server
//!
//! Axum-based web server for the maintenance desk dashboard and REST API.

pub mod auth;
pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{get, post, put},
    Router,
};
use labdesk_db::DbPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Requests
        .route("/requests", get(routes::requests::list_requests))
        .route("/requests", post(routes::requests::create_request))
        .route("/requests/{id}", get(routes::requests::get_request))
        .route(
            "/requests/{id}/view/{step}",
            get(routes::requests::view_step),
        )
        .route(
            "/requests/{id}/steps/{step}",
            put(routes::requests::save_step),
        )
        .route("/requests/{id}/advance", post(routes::requests::advance))
        .route("/requests/{id}/decision", post(routes::requests::decision))
        // Exports
        .route("/requests/{id}/export.csv", get(routes::export::export_csv))
        .route(
            "/requests/{id}/export.html",
            get(routes::export::export_html),
        )
        // Dashboard summary
        .route("/summary", get(routes::requests::summary))
        .with_state(state.clone());

    Router::new()
        .route("/", get(routes::dashboard::index))
        .nest("/api", api_routes)
        .route("/ws", get(websocket::ws_handler))
        .route("/internal/notify", post(routes::internal::notify))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(db: Arc<DbPool>, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(db);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
