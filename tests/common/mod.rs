// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use heros_journey::config::Config;
use heros_journey::db::FirestoreDb;
use heros_journey::error::AppError;
use heros_journey::models::ProfileRecord;
use heros_journey::routes::create_router;
use heros_journey::services::{
    AdminPolicy, FirebaseTokenVerifier, ProfileFetcher, ProfileFuture, RouteGate,
};
use heros_journey::AppState;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[allow(dead_code)]
pub const TEST_KID: &str = "test-kid";
#[allow(dead_code)]
pub const ADMIN_PHONE: &str = "+77777777777";
#[allow(dead_code)]
pub const USER_PHONE: &str = "+71234567890";

const TEST_PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/firebase_test_key.pem");
const TEST_PUBLIC_KEY: &[u8] = include_bytes!("../fixtures/firebase_test_key.pub.pem");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Token verifier that trusts the fixture key under [`TEST_KID`].
#[allow(dead_code)]
pub fn test_verifier(config: &Config) -> FirebaseTokenVerifier {
    let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY).expect("Invalid test public key");
    FirebaseTokenVerifier::new_with_static_key(config, TEST_KID, key)
        .expect("Failed to create test verifier")
}

/// Frontend build used by the HTTP tests: `index.html` plus `assets/app.js`.
#[allow(dead_code)]
pub fn test_static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/static")
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_profiles(Arc::new(test_db_offline()))
}

/// Create a test app backed by the given profile store.
#[allow(dead_code)]
pub fn create_test_app_with_profiles(
    profiles: Arc<dyn ProfileFetcher>,
) -> (axum::Router, Arc<AppState>) {
    let config = Config {
        static_dir: test_static_dir(),
        ..Config::test_default()
    };
    let token_verifier = Arc::new(test_verifier(&config));
    let route_gate = RouteGate::from_config(&config).expect("Invalid gate config");
    let admin_policy = AdminPolicy::new(&config.admin_phone);

    let state = Arc::new(AppState {
        config,
        profiles,
        token_verifier,
        admin_policy,
        route_gate,
    });

    (create_router(state.clone()), state)
}

/// Profile store that counts lookups and finds no profiles, or a
/// fixed record when one is given.
#[allow(dead_code)]
#[derive(Default)]
pub struct CountingProfiles {
    record: Option<ProfileRecord>,
    lookups: AtomicUsize,
}

#[allow(dead_code)]
impl CountingProfiles {
    pub fn with_record(record: ProfileRecord) -> Self {
        Self {
            record: Some(record),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ProfileFetcher for CountingProfiles {
    fn fetch_profile<'a>(&'a self, _uid: &'a str) -> ProfileFuture<'a> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok::<_, AppError>(self.record.clone()) })
    }
}

/// Claims as Firebase Auth issues them.
#[derive(Debug, Clone, Serialize)]
pub struct TestClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    pub auth_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[allow(dead_code)]
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Valid claims for `uid` in the test project.
#[allow(dead_code)]
pub fn test_claims(config: &Config, uid: &str, phone: Option<&str>) -> TestClaims {
    let now = now_secs();
    TestClaims {
        iss: format!("https://securetoken.google.com/{}", config.gcp_project_id),
        aud: config.gcp_project_id.clone(),
        sub: uid.to_string(),
        iat: now,
        exp: now + 3600,
        auth_time: now - 60,
        phone_number: phone.map(str::to_string),
        email: None,
    }
}

/// Sign claims with the fixture key.
#[allow(dead_code)]
pub fn sign_claims(claims: &TestClaims, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY).expect("Invalid test private key");
    encode(&header, claims, &key).expect("Failed to sign test token")
}

/// Valid ID token for `uid`.
#[allow(dead_code)]
pub fn create_test_id_token(config: &Config, uid: &str, phone: Option<&str>) -> String {
    sign_claims(&test_claims(config, uid, phone), TEST_KID)
}
