//! HTTP surface of the Studio agent.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::routes::{chat, composio, health, threads};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let json_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Threads
        .route("/threads", post(threads::create_thread).get(threads::get_threads))
        .route(
            "/threads/:thread_id",
            patch(threads::update_thread).delete(threads::delete_thread),
        )
        // Connectors
        .route("/composio/apps", get(composio::list_apps))
        .route("/composio/connections", get(composio::list_connections))
        .route("/composio/connect", post(composio::connect))
        .route("/composio/disconnect", post(composio::disconnect))
        .route("/composio/tools", get(composio::list_tools))
        .layer(CompressionLayer::new());

    // SSE stays uncompressed so frames are flushed as they are produced
    let stream_routes = Router::new().route("/chat", post(chat::chat));

    Router::new()
        .merge(json_routes)
        .merge(stream_routes)
        .layer(axum_middleware::from_fn(middleware::logging::log_request))
        .layer(TimeoutLayer::new(Duration::from_secs(300))) // 5 min for streaming
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PATCH,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            let origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            cors = cors.allow_origin(origins);
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}
