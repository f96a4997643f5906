// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed-in principal as reported by the authentication provider.

use serde::{Deserialize, Serialize};

/// Identity of a signed-in user (Firebase Auth user record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user ID (also used as profile document ID)
    pub uid: String,
    /// Phone number in E.164 format, when signed in by phone
    pub phone_number: Option<String>,
    /// Email address, when signed in by email
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            phone_number: None,
            email: None,
        }
    }

    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
