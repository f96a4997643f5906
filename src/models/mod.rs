// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod identity;
pub mod profile;
pub mod session;

pub use identity::Identity;
pub use profile::{Profile, ProfileRecord, Role};
pub use session::SessionState;
