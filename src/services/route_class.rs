// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route classification.
//!
//! Every path maps to exactly one [`RouteClass`]. Admin paths are matched by
//! prefix on a segment boundary, public paths by exact match, and everything
//! else is protected.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Prefix reserved for the admin console.
pub const ADMIN_PREFIX: &str = "/admin";

/// Paths reachable without a session.
pub const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/auth",
    "/hero/phone-login",
    "/hero/email-login",
    "/privacy",
    "/terms",
];

/// Access class of a navigational path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RouteClass {
    /// No session required
    Public,
    /// Session required
    Protected,
    /// Session and admin privilege required
    Admin,
}

/// A product route and the class it must fall into.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub path: &'static str,
    pub class: RouteClass,
}

const fn entry(path: &'static str, class: RouteClass) -> RouteEntry {
    RouteEntry { path, class }
}

/// Every page route of the application, with dynamic segments shown in
/// brackets as the frontend router names them.
pub const ROUTE_TABLE: &[RouteEntry] = &[
    entry("/", RouteClass::Public),
    entry("/auth", RouteClass::Public),
    entry("/hero/phone-login", RouteClass::Public),
    entry("/hero/email-login", RouteClass::Public),
    entry("/privacy", RouteClass::Public),
    entry("/terms", RouteClass::Public),
    entry("/hero/home", RouteClass::Protected),
    entry("/hero/programs", RouteClass::Protected),
    entry("/hero/programs/[programId]", RouteClass::Protected),
    entry("/hero/workouts/[workoutId]", RouteClass::Protected),
    entry("/hero/workout-session/[workoutId]", RouteClass::Protected),
    entry("/hero/profile", RouteClass::Protected),
    entry("/hero/clans", RouteClass::Protected),
    entry("/hero/clans/[clanId]", RouteClass::Protected),
    entry("/hero/leaderboard", RouteClass::Protected),
    entry("/hero/settings", RouteClass::Protected),
    entry("/admin", RouteClass::Admin),
    entry("/admin/workouts", RouteClass::Admin),
    entry("/admin/workouts/new", RouteClass::Admin),
    entry("/admin/workouts/[workoutId]", RouteClass::Admin),
    entry("/admin/programs", RouteClass::Admin),
    entry("/admin/programs/new", RouteClass::Admin),
    entry("/admin/programs/[programId]", RouteClass::Admin),
    entry("/admin/clans", RouteClass::Admin),
    entry("/admin/settings", RouteClass::Admin),
];

/// Strip query string, fragment and trailing slashes.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Classify a path. Total and stable: every input yields one class, always
/// the same one.
pub fn classify(path: &str) -> RouteClass {
    let path = normalize_path(path);

    let is_admin = path
        .strip_prefix(ADMIN_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));

    if is_admin {
        RouteClass::Admin
    } else if PUBLIC_PATHS.contains(&path) {
        RouteClass::Public
    } else {
        RouteClass::Protected
    }
}
