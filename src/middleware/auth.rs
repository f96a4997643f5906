// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity middleware.

use crate::error::AppError;
use crate::models::SessionState;
use crate::services::TokenError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Cookie carrying the Firebase ID token (the only cookie Firebase Hosting
/// forwards to backends).
pub const SESSION_COOKIE: &str = "__session";

/// Verify the caller's ID token and attach the resulting [`SessionState`].
///
/// The attached state carries the identity and admin flag but no profile;
/// handlers that show the profile resolve it themselves. A missing or
/// invalid token yields a signed-out session. Only a failure to fetch
/// signing keys aborts the request.
pub async fn attach_identity(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(request.headers()));

    let session = match token {
        None => SessionState::signed_out(),
        Some(token) => match state.token_verifier.verify(&token).await {
            Ok(identity) => SessionState::signed_in(identity, None, &state.admin_policy),
            Err(TokenError::Invalid(reason)) => {
                tracing::debug!(reason = %reason, "Ignoring invalid ID token");
                SessionState::signed_out()
            }
            Err(TokenError::Transient(reason)) => {
                return Err(AppError::Unavailable(reason));
            }
        },
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Reject requests without a signed-in identity.
pub async fn require_session(
    Extension(session): Extension<SessionState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !session.is_signed_in() {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// Hide admin endpoints from everyone but admins.
pub async fn require_admin(
    Extension(session): Extension<SessionState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !session.is_admin() {
        tracing::warn!(
            uid = session.identity().map(|identity| identity.uid.as_str()),
            path = %request.uri().path(),
            "Blocked non-admin request to admin API"
        );
        return Err(AppError::NotFound(request.uri().path().to_string()));
    }
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
