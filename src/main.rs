// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hero's Journey API Server
//!
//! Fronts the web app: verifies Firebase sessions, gates page navigations
//! and serves the built frontend.

use heros_journey::{
    config::Config,
    db::FirestoreDb,
    services::{AdminPolicy, FirebaseTokenVerifier, RouteGate},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Hero's Journey API");

    let route_gate = RouteGate::from_config(&config).expect("Invalid route gate configuration");
    tracing::info!(
        sign_in = route_gate.sign_in_path(),
        home = route_gate.home_path(),
        "Route gate configured"
    );

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let token_verifier = Arc::new(
        FirebaseTokenVerifier::new(&config).expect("Failed to initialize token verifier"),
    );

    let admin_policy = AdminPolicy::new(&config.admin_phone);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        profiles: Arc::new(db),
        token_verifier,
        admin_policy,
        route_gate,
    });

    // Build router
    let app = heros_journey::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("heros_journey=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
