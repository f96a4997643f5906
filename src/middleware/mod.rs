// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (identity, route gate, security headers).

pub mod auth;
pub mod gate;
pub mod security;

pub use auth::{attach_identity, require_admin, require_session};
pub use gate::enforce_route_gate;
