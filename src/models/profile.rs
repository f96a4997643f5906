// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned to a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Coach,
    Admin,
}

impl Role {
    /// Parse a stored role name. Unknown names yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "coach" => Some(Role::Coach),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Profile document as stored in Firestore (`users/{uid}`).
///
/// Every field is optional: documents written by older app versions
/// may lack any of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Accumulated experience points
    #[serde(default)]
    pub xp: Option<i64>,
    #[serde(default)]
    pub streak: Option<i64>,
    #[serde(default)]
    pub active_program_id: Option<String>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Normalized user profile used by the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub experience: u64,
    pub streak: u32,
    pub active_program: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Normalize a stored record.
    ///
    /// Missing or unknown roles fall back to `Role::User`; missing or
    /// negative counters become zero.
    pub fn from_record(uid: &str, record: ProfileRecord) -> Self {
        let role = match record.role.as_deref() {
            Some(raw) => Role::parse(raw).unwrap_or_else(|| {
                tracing::warn!(uid, role = raw, "Unknown profile role, treating as user");
                Role::User
            }),
            None => Role::User,
        };

        Self {
            uid: uid.to_string(),
            display_name: record.display_name.filter(|name| !name.trim().is_empty()),
            email: record.email,
            role,
            experience: record.xp.map(|xp| xp.max(0) as u64).unwrap_or(0),
            streak: record
                .streak
                .map(|streak| streak.clamp(0, u32::MAX as i64) as u32)
                .unwrap_or(0),
            active_program: record.active_program_id,
            created_at: record.created_at,
        }
    }
}
