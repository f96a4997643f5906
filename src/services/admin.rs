// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin privilege check.
//!
//! This is the only place that decides whether an identity may enter the
//! admin zone. The route gate, the session state and the admin API guard all
//! go through [`AdminPolicy::is_admin`].

use crate::models::Identity;

/// Phone number of the privileged account.
pub const DEFAULT_ADMIN_PHONE: &str = "+77777777777";

/// Admin privilege predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPolicy {
    /// Normalized privileged phone number; `None` disables the admin zone.
    privileged_phone: Option<String>,
}

impl Default for AdminPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_PHONE)
    }
}

impl AdminPolicy {
    pub fn new(privileged_phone: &str) -> Self {
        let privileged_phone = normalize_phone(privileged_phone);
        if privileged_phone.is_none() {
            tracing::warn!("Admin phone number is not a valid phone number; admin zone disabled");
        }
        Self { privileged_phone }
    }

    /// True iff the identity's phone number is the privileged number.
    pub fn is_admin(&self, identity: Option<&Identity>) -> bool {
        let Some(privileged) = self.privileged_phone.as_deref() else {
            return false;
        };

        identity
            .and_then(|identity| identity.phone_number.as_deref())
            .and_then(normalize_phone)
            .is_some_and(|phone| phone == privileged)
    }
}

/// Reduce a phone number to `+` and digits.
///
/// Spaces, dashes, dots and parentheses are formatting and are dropped.
/// Anything else makes the number invalid.
fn normalize_phone(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let mut normalized = String::with_capacity(raw.len());

    for (i, c) in raw.chars().enumerate() {
        match c {
            '+' if i == 0 => normalized.push(c),
            '0'..='9' => normalized.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return None,
        }
    }

    if normalized.chars().any(|c| c.is_ascii_digit()) {
        Some(normalized)
    } else {
        None
    }
}
