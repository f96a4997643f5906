// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile lookup.

use crate::error::AppError;
use crate::models::{Profile, ProfileRecord};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Pending result of [`ProfileFetcher::fetch_profile`].
pub type ProfileFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<ProfileRecord>, AppError>> + Send + 'a>>;

/// Point lookup of a stored profile by identity uid.
///
/// `Ok(None)` means the profile does not exist yet, which is a normal state
/// for a new user. Object safe, so the server can hold any store as
/// `Arc<dyn ProfileFetcher>`.
pub trait ProfileFetcher: Send + Sync + 'static {
    fn fetch_profile<'a>(&'a self, uid: &'a str) -> ProfileFuture<'a>;
}

/// Fetch and normalize a profile.
///
/// Lookup failures and timeouts are logged and reported as no profile; they
/// never hold up session resolution.
pub async fn load_profile<F: ProfileFetcher + ?Sized>(
    fetcher: &F,
    uid: &str,
    timeout: Duration,
) -> Option<Profile> {
    match tokio::time::timeout(timeout, fetcher.fetch_profile(uid)).await {
        Ok(Ok(Some(record))) => Some(Profile::from_record(uid, record)),
        Ok(Ok(None)) => {
            tracing::debug!(uid, "No profile stored for identity");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(uid, error = %e, "Profile lookup failed, continuing without profile");
            None
        }
        Err(_) => {
            tracing::warn!(
                uid,
                timeout_ms = timeout.as_millis() as u64,
                "Profile lookup timed out, continuing without profile"
            );
            None
        }
    }
}
