// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod admin;
pub mod api;

use crate::middleware::{attach_identity, enforce_route_gate, require_admin};
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Admin API (admin privilege required)
    let admin_routes = admin::routes().route_layer(middleware::from_fn(require_admin));

    let api_routes = api::routes().merge(admin_routes).layer(middleware::from_fn_with_state(
        state.clone(),
        attach_identity,
    ));

    // Frontend: files in the build are served as-is. Any other path is a
    // page navigation and gets the app shell, behind the route gate.
    let static_dir = &state.config.static_dir;
    let app_shell: Router = Router::new()
        .fallback_service(ServeFile::new(static_dir.join("index.html")))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_route_gate,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            attach_identity,
        ))
        .with_state(state.clone());
    let frontend = ServeDir::new(static_dir)
        .append_index_html_on_directories(false)
        .fallback(app_shell);

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .fallback_service(frontend)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
