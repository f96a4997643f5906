// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session and gating logic.

pub mod admin;
pub mod identity_token;
pub mod profile;
pub mod route_class;
pub mod route_gate;
pub mod session;

pub use admin::{AdminPolicy, DEFAULT_ADMIN_PHONE};
pub use identity_token::{FirebaseTokenVerifier, TokenError};
pub use profile::{load_profile, ProfileFetcher, ProfileFuture};
pub use route_class::{classify, RouteClass};
pub use route_gate::{GateMachine, Redirect, RedirectReason, RouteGate};
pub use session::{
    resolve_session, IdentityFeed, IdentitySubscription, SessionAggregator, SessionHandle,
};
