// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session aggregation.
//!
//! [`IdentityFeed`] is the seam where the authentication provider reports
//! identity changes. [`SessionAggregator`] turns those changes into
//! [`SessionState`] updates, fetching the profile for each new identity.
//!
//! A profile fetch is raced against the next identity change. When the
//! identity changes first, the pending fetch is dropped, so a slow lookup
//! for a previous user can never land on the current session.

use crate::models::{Identity, SessionState};
use crate::services::profile::{load_profile, ProfileFetcher};
use crate::services::AdminPolicy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
enum FeedState {
    /// The provider has not reported yet.
    Pending,
    Resolved(Option<Identity>),
}

/// Source of identity changes.
#[derive(Debug, Clone)]
pub struct IdentityFeed {
    tx: Arc<watch::Sender<FeedState>>,
}

impl Default for IdentityFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FeedState::Pending);
        Self { tx: Arc::new(tx) }
    }

    /// Report the current identity (`None` when signed out).
    pub fn publish(&self, identity: Option<Identity>) {
        self.tx.send_replace(FeedState::Resolved(identity));
    }

    /// Subscribe to identity changes. A subscriber that joins after the
    /// provider has reported sees the current identity first.
    pub fn subscribe(&self) -> IdentitySubscription {
        let mut rx = self.tx.subscribe();
        if matches!(*rx.borrow(), FeedState::Resolved(_)) {
            rx.mark_changed();
        }
        IdentitySubscription { rx }
    }
}

/// Subscription to an [`IdentityFeed`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct IdentitySubscription {
    rx: watch::Receiver<FeedState>,
}

impl IdentitySubscription {
    /// Wait for the next identity. Returns `None` once the feed is gone.
    ///
    /// Cancel safe: if the future is dropped, no change is lost.
    pub async fn next(&mut self) -> Option<Option<Identity>> {
        loop {
            self.rx.changed().await.ok()?;
            if let FeedState::Resolved(identity) = &*self.rx.borrow_and_update() {
                return Some(identity.clone());
            }
        }
    }
}

/// Resolve the session for a single identity (request-scoped).
pub async fn resolve_session<F: ProfileFetcher + ?Sized>(
    identity: Option<Identity>,
    fetcher: &F,
    policy: &AdminPolicy,
    fetch_timeout: Duration,
) -> SessionState {
    match identity {
        None => SessionState::signed_out(),
        Some(identity) => {
            let profile = load_profile(fetcher, &identity.uid, fetch_timeout).await;
            SessionState::signed_in(identity, profile, policy)
        }
    }
}

/// Combines identity changes and profile lookups into session state.
pub struct SessionAggregator<F> {
    fetcher: Arc<F>,
    policy: AdminPolicy,
    fetch_timeout: Duration,
}

impl<F: ProfileFetcher> SessionAggregator<F> {
    pub fn new(fetcher: Arc<F>, policy: AdminPolicy, fetch_timeout: Duration) -> Self {
        Self {
            fetcher,
            policy,
            fetch_timeout,
        }
    }

    /// Start aggregating. The returned handle owns the background task;
    /// dropping it stops all further updates.
    pub fn spawn(self, subscription: IdentitySubscription) -> SessionHandle {
        let (tx, rx) = watch::channel(SessionState::loading());
        let task = tokio::spawn(self.run(subscription, tx));
        SessionHandle { state: rx, task }
    }

    async fn run(self, mut subscription: IdentitySubscription, tx: watch::Sender<SessionState>) {
        let mut next = subscription.next().await;

        while let Some(identity) = next.take() {
            let Some(identity) = identity else {
                tx.send_modify(|state| {
                    state.set_identity(None, &self.policy);
                    state.finish_loading();
                });
                tracing::debug!("Session resolved: signed out");
                next = subscription.next().await;
                continue;
            };

            tx.send_modify(|state| state.set_identity(Some(identity.clone()), &self.policy));

            let uid = identity.uid;
            let lookup = load_profile(self.fetcher.as_ref(), &uid, self.fetch_timeout);
            tokio::pin!(lookup);

            next = loop {
                tokio::select! {
                    biased;

                    changed = subscription.next() => match changed {
                        // Same user re-reported (e.g. token refresh): keep the lookup.
                        Some(Some(refreshed)) if refreshed.uid == uid => {
                            tx.send_modify(|state| state.set_identity(Some(refreshed), &self.policy));
                        }
                        changed => {
                            tracing::debug!(
                                uid = %uid,
                                "Identity changed before profile lookup finished, discarding lookup"
                            );
                            break changed;
                        }
                    },
                    profile = &mut lookup => {
                        tx.send_modify(|state| {
                            state.set_profile(profile);
                            state.finish_loading();
                        });
                        tracing::debug!(uid = %uid, "Session resolved: signed in");
                        break subscription.next().await;
                    }
                }
            };
        }

        tracing::debug!("Identity feed closed, session aggregation stopped");
    }
}

/// Handle to a running [`SessionAggregator`].
#[derive(Debug)]
pub struct SessionHandle {
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Snapshot of the current state.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver for state changes, e.g. to drive a
    /// [`GateMachine`](crate::services::route_gate::GateMachine).
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Wait until the first resolution has completed.
    pub async fn resolved(&mut self) -> Option<SessionState> {
        self.state
            .wait_for(|state| !state.is_loading())
            .await
            .ok()
            .map(|state| state.clone())
    }

    /// Stop aggregating and wait for the task to finish.
    ///
    /// Once this returns no further state is published. Dropping the handle
    /// also stops the task, but without waiting for it.
    pub async fn shutdown(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
