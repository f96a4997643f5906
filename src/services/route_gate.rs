// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route gate: redirect decisions from session state and path.
//!
//! Decision table, first match wins:
//!
//! | Condition                                   | Redirect to    |
//! |---------------------------------------------|----------------|
//! | admin path, not admin, signed in            | home           |
//! | admin path, not admin, signed out           | sign-in        |
//! | non-public path, signed out                 | sign-in        |
//! | signed in, on the sign-in entry path        | home           |
//!
//! No decision is made while the session is loading. Every redirect target
//! is a fixed point: evaluating the gate again at the target under the same
//! state yields no redirect.

use crate::config::{Config, ConfigError};
use crate::models::SessionState;
use crate::services::route_class::{classify, normalize_path, RouteClass};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Why the gate redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RedirectReason {
    AdminRequired,
    SignInRequired,
    AlreadySignedIn,
}

/// Client-side navigation command issued by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    pub reason: RedirectReason,
}

/// Redirect rules for the three route zones.
#[derive(Debug, Clone)]
pub struct RouteGate {
    sign_in_path: String,
    home_path: String,
}

impl RouteGate {
    /// Create a gate, rejecting path pairs that could redirect in a loop.
    ///
    /// The sign-in entry must be public and the home path must be neither
    /// admin nor the sign-in entry.
    pub fn new(sign_in_path: &str, home_path: &str) -> Result<Self, ConfigError> {
        let sign_in_path = normalize_path(sign_in_path).to_string();
        let home_path = normalize_path(home_path).to_string();

        if classify(&sign_in_path) != RouteClass::Public {
            return Err(ConfigError::Invalid(format!(
                "sign-in path {sign_in_path} must be a public route"
            )));
        }
        if classify(&home_path) == RouteClass::Admin {
            return Err(ConfigError::Invalid(format!(
                "home path {home_path} must not be an admin route"
            )));
        }
        if home_path == sign_in_path {
            return Err(ConfigError::Invalid(
                "home path and sign-in path must differ".to_string(),
            ));
        }

        Ok(Self {
            sign_in_path,
            home_path,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.sign_in_path, &config.home_path)
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Decide whether `path` is consistent with `session`.
    pub fn evaluate(&self, session: &SessionState, path: &str) -> Option<Redirect> {
        if session.is_loading() {
            return None;
        }

        let path = normalize_path(path);
        let class = classify(path);
        let signed_in = session.is_signed_in();

        if class == RouteClass::Admin && !session.is_admin() {
            // A signed-out caller would bounce home and then on to sign-in;
            // send them straight to sign-in instead.
            return Some(if signed_in {
                self.redirect_home(RedirectReason::AdminRequired)
            } else {
                self.redirect_sign_in()
            });
        }

        if class != RouteClass::Public && !signed_in {
            return Some(self.redirect_sign_in());
        }

        if signed_in && path == self.sign_in_path {
            return Some(self.redirect_home(RedirectReason::AlreadySignedIn));
        }

        None
    }

    fn redirect_home(&self, reason: RedirectReason) -> Redirect {
        Redirect {
            to: self.home_path.clone(),
            reason,
        }
    }

    fn redirect_sign_in(&self) -> Redirect {
        Redirect {
            to: self.sign_in_path.clone(),
            reason: RedirectReason::SignInRequired,
        }
    }
}

/// Gate state machine with two inputs (navigation, session change) and one
/// output (redirect).
///
/// The machine tracks the current path and applies its own redirects to it,
/// so a redirect is issued at most once per (state, path) pair.
#[derive(Debug)]
pub struct GateMachine {
    gate: RouteGate,
    session: SessionState,
    path: String,
}

impl GateMachine {
    pub fn new(gate: RouteGate, initial_path: &str) -> Self {
        Self {
            gate,
            session: SessionState::loading(),
            path: normalize_path(initial_path).to_string(),
        }
    }

    pub fn current_path(&self) -> &str {
        &self.path
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The user navigated to `path`.
    pub fn navigate(&mut self, path: &str) -> Option<Redirect> {
        let path = normalize_path(path);
        if path == self.path {
            return None;
        }
        self.path = path.to_string();
        self.reevaluate()
    }

    /// The aggregated session changed.
    pub fn session_changed(&mut self, session: SessionState) -> Option<Redirect> {
        if session == self.session {
            return None;
        }
        self.session = session;
        self.reevaluate()
    }

    fn reevaluate(&mut self) -> Option<Redirect> {
        let redirect = self.gate.evaluate(&self.session, &self.path)?;
        tracing::debug!(
            from = %self.path,
            to = %redirect.to,
            reason = ?redirect.reason,
            "Route gate redirect"
        );
        self.path = redirect.to.clone();
        Some(redirect)
    }

    /// Drive the machine from a session channel and a navigation channel,
    /// sending redirects until either input closes or the redirect receiver
    /// is dropped.
    pub async fn run(
        mut self,
        mut session: watch::Receiver<SessionState>,
        mut navigations: mpsc::Receiver<String>,
        redirects: mpsc::Sender<Redirect>,
    ) {
        let initial = session.borrow_and_update().clone();
        if let Some(redirect) = self.session_changed(initial) {
            if redirects.send(redirect).await.is_err() {
                return;
            }
        }

        loop {
            let redirect = tokio::select! {
                changed = session.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = session.borrow_and_update().clone();
                    self.session_changed(state)
                }
                path = navigations.recv() => {
                    let Some(path) = path else {
                        break;
                    };
                    self.navigate(&path)
                }
            };

            if let Some(redirect) = redirect {
                if redirects.send(redirect).await.is_err() {
                    break;
                }
            }
        }

        tracing::debug!("Route gate stopped");
    }
}
