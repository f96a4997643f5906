// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the frontend session.

use crate::error::{AppError, Result};
use crate::middleware::require_session;
use crate::models::{Profile, SessionState};
use crate::services::route_class::normalize_path;
use crate::services::{classify, resolve_session, RedirectReason, RouteClass};
use crate::AppState;
use axum::{
    extract::{Query, State},
    middleware,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes. `/api/session` and `/api/gate` answer for signed-out callers
/// too; `/api/me` requires a session. Only the session and profile
/// endpoints look up the profile.
pub fn routes() -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/api/me", get(get_me))
        .route_layer(middleware::from_fn(require_session));

    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/gate", get(get_gate))
        .merge(protected)
}

// ─── Session ─────────────────────────────────────────────────

/// Current session state (signed-out state when no valid token was sent).
async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionState>,
) -> Json<SessionState> {
    Json(with_profile(&state, session).await)
}

/// Current user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionState>,
) -> Result<Json<Profile>> {
    let session = with_profile(&state, session).await;
    let identity = session.identity().ok_or(AppError::Unauthorized)?;
    let profile = session
        .profile()
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", identity.uid)))?;
    Ok(Json(profile))
}

/// Complete an identity-only session with the caller's profile.
async fn with_profile(state: &AppState, session: SessionState) -> SessionState {
    if !session.is_signed_in() {
        return session;
    }
    resolve_session(
        session.identity().cloned(),
        state.profiles.as_ref(),
        &state.admin_policy,
        state.config.profile_fetch_timeout,
    )
    .await
}

// ─── Route Gate ──────────────────────────────────────────────

#[derive(Deserialize)]
struct GateQuery {
    path: String,
}

/// Gate decision for a path under the caller's session.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GateResponse {
    pub path: String,
    pub class: RouteClass,
    pub redirect_to: Option<String>,
    pub reason: Option<RedirectReason>,
}

async fn get_gate(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionState>,
    Query(query): Query<GateQuery>,
) -> Result<Json<GateResponse>> {
    if !query.path.starts_with('/') {
        return Err(AppError::BadRequest(
            "'path' must be an absolute path".to_string(),
        ));
    }

    let path = normalize_path(&query.path).to_string();
    let redirect = state.route_gate.evaluate(&session, &path);

    Ok(Json(GateResponse {
        class: classify(&path),
        redirect_to: redirect.as_ref().map(|r| r.to.clone()),
        reason: redirect.map(|r| r.reason),
        path,
    }))
}
