// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token verification.
//!
//! The server-side session source: a request carries the Firebase ID token
//! of the signed-in user, which is verified here against Google's
//! securetoken signing keys and turned into an [`Identity`].

use crate::config::Config;
use crate::models::Identity;
use anyhow::Context;
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet, KeyAlgorithm, PublicKeyUse};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::{HeaderMap, CACHE_CONTROL};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

const SIGNING_KEYS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
/// Used when the key response carries no `max-age`.
const FALLBACK_KEY_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;
const MAX_UID_LEN: usize = 128;

/// Token verification error categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is malformed, expired or issued for another project.
    Invalid(String),
    /// Signing keys could not be fetched.
    Transient(String),
}

/// Where signing keys come from.
enum KeySource {
    /// Google's published securetoken keys, refreshed when stale.
    Securetoken {
        http_client: reqwest::Client,
        keys: RwLock<Option<SigningKeys>>,
    },
    /// One fixed key, for tests and local development.
    Fixed { kid: String, key: Arc<DecodingKey> },
}

/// One download of the securetoken key set.
struct SigningKeys {
    by_kid: HashMap<String, Arc<DecodingKey>>,
    fresh_until: Instant,
}

impl SigningKeys {
    /// Keep the RSA signing keys that can verify RS256 tokens.
    fn from_jwk_set(set: &JwkSet, ttl: Duration) -> Self {
        let by_kid = set
            .keys
            .iter()
            .filter(|jwk| matches!(jwk.algorithm, AlgorithmParameters::RSA(_)))
            .filter(|jwk| {
                jwk.common
                    .key_algorithm
                    .is_none_or(|alg| alg == KeyAlgorithm::RS256)
            })
            .filter(|jwk| {
                jwk.common
                    .public_key_use
                    .as_ref()
                    .is_none_or(|key_use| *key_use == PublicKeyUse::Signature)
            })
            .filter_map(|jwk| {
                let kid = jwk.common.key_id.as_deref()?.trim();
                if kid.is_empty() {
                    return None;
                }
                match DecodingKey::from_jwk(jwk) {
                    Ok(key) => Some((kid.to_string(), Arc::new(key))),
                    Err(e) => {
                        tracing::warn!(kid, error = %e, "Skipping unusable signing key");
                        None
                    }
                }
            })
            .collect();

        Self {
            by_kid,
            fresh_until: Instant::now() + ttl,
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() < self.fresh_until
    }

    fn get(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        self.by_kid.get(kid).cloned()
    }
}

/// Verifier for Firebase Auth ID tokens.
pub struct FirebaseTokenVerifier {
    project_id: String,
    source: KeySource,
}

impl FirebaseTokenVerifier {
    /// Create a production verifier that fetches and caches Google's keys.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building signing key HTTP client")?;

        tracing::info!(
            project = %config.gcp_project_id,
            "Initialized Firebase ID token verifier"
        );

        Ok(Self {
            project_id: config.gcp_project_id.clone(),
            source: KeySource::Securetoken {
                http_client,
                keys: RwLock::new(None),
            },
        })
    }

    /// Create a verifier that trusts a single RSA public key under `kid`.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static key kid must not be empty");
        }

        Ok(Self {
            project_id: config.gcp_project_id.clone(),
            source: KeySource::Fixed {
                kid,
                key: Arc::new(decoding_key),
            },
        })
    }

    /// Verify an ID token and return the identity it carries.
    pub async fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let header = decode_header(token)
            .map_err(|e| TokenError::Invalid(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(TokenError::Invalid(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| TokenError::Invalid("missing JWT kid".to_string()))?;

        let key = self.signing_key(&kid).await?;

        let issuer = format!("{ISSUER_PREFIX}{}", self.project_id);
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<IdTokenClaims>(token, key.as_ref(), &validation)
            .map_err(|e| TokenError::Invalid(format!("JWT validation failed: {e}")))?
            .claims;

        let latest = now_unix_secs() + CLOCK_SKEW_SECS;
        not_after("iat", claims.iat, latest)?;
        not_after("auth_time", claims.auth_time, latest)?;

        if claims.sub.is_empty() || claims.sub.len() > MAX_UID_LEN {
            return Err(TokenError::Invalid("invalid sub claim".to_string()));
        }

        tracing::debug!(
            uid = %claims.sub,
            has_phone = claims.phone_number.is_some(),
            has_email = claims.email.is_some(),
            "Firebase ID token verified"
        );

        Ok(Identity {
            uid: claims.sub,
            phone_number: claims.phone_number,
            email: claims.email,
        })
    }

    async fn signing_key(&self, kid: &str) -> Result<Arc<DecodingKey>, TokenError> {
        let (http_client, keys) = match &self.source {
            KeySource::Fixed {
                kid: fixed_kid,
                key,
            } => {
                return if kid == fixed_kid {
                    Ok(key.clone())
                } else {
                    Err(TokenError::Invalid(format!("unknown JWT kid: {kid}")))
                };
            }
            KeySource::Securetoken { http_client, keys } => (http_client, keys),
        };

        {
            let cached = keys.read().await;
            if let Some(key) = cached
                .as_ref()
                .filter(|keys| keys.is_fresh())
                .and_then(|keys| keys.get(kid))
            {
                return Ok(key);
            }
        }

        // Stale keys, or a kid we have not seen (Google rotates keys).
        // The write lock makes concurrent misses share one download.
        let mut cached = keys.write().await;
        if let Some(key) = cached
            .as_ref()
            .filter(|keys| keys.is_fresh())
            .and_then(|keys| keys.get(kid))
        {
            return Ok(key);
        }

        let fresh = download_signing_keys(http_client).await?;
        let key = fresh.get(kid);
        *cached = Some(fresh);

        key.ok_or_else(|| TokenError::Invalid(format!("unknown JWT kid: {kid}")))
    }
}

async fn download_signing_keys(http_client: &reqwest::Client) -> Result<SigningKeys, TokenError> {
    tracing::debug!(url = SIGNING_KEYS_URL, "Downloading Firebase signing keys");

    let response = http_client
        .get(SIGNING_KEYS_URL)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| TokenError::Transient(format!("signing key request failed: {e}")))?;

    let ttl = max_age(response.headers()).unwrap_or(FALLBACK_KEY_TTL);

    let set: JwkSet = response
        .json()
        .await
        .map_err(|e| TokenError::Transient(format!("invalid signing key set: {e}")))?;

    let keys = SigningKeys::from_jwk_set(&set, ttl);
    if keys.by_kid.is_empty() {
        return Err(TokenError::Transient(
            "signing key set has no usable RSA keys".to_string(),
        ));
    }

    tracing::debug!(
        keys = keys.by_kid.len(),
        ttl_secs = ttl.as_secs(),
        "Firebase signing keys downloaded"
    );
    Ok(keys)
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    iat: Option<u64>,
    auth_time: Option<u64>,
    phone_number: Option<String>,
    email: Option<String>,
}

/// Require a timestamp claim no later than `latest`.
fn not_after(claim: &str, value: Option<u64>, latest: u64) -> Result<(), TokenError> {
    match value {
        None => Err(TokenError::Invalid(format!("missing {claim} claim"))),
        Some(value) if value > latest => {
            Err(TokenError::Invalid(format!("{claim} claim is in the future")))
        }
        Some(_) => Ok(()),
    }
}

/// `max-age` of a `Cache-Control` header, if present.
fn max_age(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(CACHE_CONTROL)?
        .to_str()
        .ok()?
        .split(',')
        .find_map(|directive| directive.trim().strip_prefix("max-age="))
        .and_then(|secs| secs.trim_matches('"').parse().ok())
        .map(Duration::from_secs)
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
