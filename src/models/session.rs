// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Aggregated session state.

use serde::Serialize;

use crate::models::{Identity, Profile};
use crate::services::AdminPolicy;

/// Current identity, its profile and the flags derived from them.
///
/// The admin flag is computed from the identity by [`AdminPolicy`] whenever
/// the identity changes; it cannot be set independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    identity: Option<Identity>,
    profile: Option<Profile>,
    loading: bool,
    is_admin: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::loading()
    }
}

impl SessionState {
    /// State before the first identity resolution.
    pub fn loading() -> Self {
        Self {
            identity: None,
            profile: None,
            loading: true,
            is_admin: false,
        }
    }

    /// Resolved state with nobody signed in.
    pub fn signed_out() -> Self {
        Self {
            loading: false,
            ..Self::loading()
        }
    }

    /// Resolved state for a signed-in identity.
    pub fn signed_in(identity: Identity, profile: Option<Profile>, policy: &AdminPolicy) -> Self {
        let mut state = Self::signed_out();
        state.set_identity(Some(identity), policy);
        state.profile = profile;
        state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Replace the identity. The profile is dropped when the uid changes.
    pub(crate) fn set_identity(&mut self, identity: Option<Identity>, policy: &AdminPolicy) {
        let same_uid = matches!(
            (&self.identity, &identity),
            (Some(current), Some(next)) if current.uid == next.uid
        );
        if !same_uid {
            self.profile = None;
        }
        self.is_admin = policy.is_admin(identity.as_ref());
        self.identity = identity;
    }

    pub(crate) fn set_profile(&mut self, profile: Option<Profile>) {
        self.profile = profile;
    }

    pub(crate) fn finish_loading(&mut self) {
        self.loading = false;
    }
}
