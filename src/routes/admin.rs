// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin API routes. The admin guard is applied in routes/mod.rs.

use crate::error::{AppError, Result};
use crate::models::Profile;
use crate::services::ProfileFetcher;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/profiles/{uid}", get(get_profile))
}

/// Look up any user's profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<Profile>> {
    let record = state
        .profiles
        .fetch_profile(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))?;

    Ok(Json(Profile::from_record(&uid, record)))
}
