// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hero's Journey: session gating for the fitness web app
//!
//! This crate aggregates the signed-in identity and its profile into a
//! session state and decides which zone (public, app, admin) a navigation
//! may land in. The same logic backs the HTTP server that fronts the app.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{AdminPolicy, FirebaseTokenVerifier, ProfileFetcher, RouteGate};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Profile store (Firestore in production)
    pub profiles: Arc<dyn ProfileFetcher>,
    pub token_verifier: Arc<FirebaseTokenVerifier>,
    pub admin_policy: AdminPolicy,
    pub route_gate: RouteGate,
}
