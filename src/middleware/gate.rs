// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route gate middleware for page navigations.

use crate::models::SessionState;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use std::sync::Arc;

/// Redirect page navigations that are inconsistent with the session.
///
/// Mounted in front of the app shell only. Files that exist in the frontend
/// build are served before this runs, so every request seen here is a
/// navigation, whatever its path looks like.
pub async fn enforce_route_gate(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(redirect) = state.route_gate.evaluate(&session, request.uri().path()) {
        tracing::info!(
            path = %request.uri().path(),
            to = %redirect.to,
            reason = ?redirect.reason,
            "Route gate redirect"
        );
        return Redirect::temporary(&redirect.to).into_response();
    }

    next.run(request).await
}
