// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::services::DEFAULT_ADMIN_PHONE;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SIGN_IN_PATH: &str = "/auth";
const DEFAULT_HOME_PATH: &str = "/hero/home";
const DEFAULT_PROFILE_FETCH_TIMEOUT_MS: u64 = 5000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase/GCP project ID (token audience and Firestore project)
    pub gcp_project_id: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Directory holding the built frontend
    pub static_dir: PathBuf,

    // --- Session gate ---
    /// Phone number of the admin account
    pub admin_phone: String,
    /// Where signed-out users are sent
    pub sign_in_path: String,
    /// Where signed-in users land
    pub home_path: String,
    /// Upper bound on a profile lookup
    pub profile_fetch_timeout: Duration,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            static_dir: PathBuf::from("web/dist"),
            admin_phone: DEFAULT_ADMIN_PHONE.to_string(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            profile_fetch_timeout: Duration::from_millis(500),
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let profile_fetch_timeout = match env::var("PROFILE_FETCH_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or_else(|| {
                    ConfigError::Invalid(format!("PROFILE_FETCH_TIMEOUT_MS is not valid: {raw}"))
                })?,
            Err(_) => Duration::from_millis(DEFAULT_PROFILE_FETCH_TIMEOUT_MS),
        };

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("web/dist")),
            admin_phone: env::var("ADMIN_PHONE")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PHONE.to_string()),
            sign_in_path: env::var("SIGN_IN_PATH")
                .unwrap_or_else(|_| DEFAULT_SIGN_IN_PATH.to_string()),
            home_path: env::var("HOME_PATH").unwrap_or_else(|_| DEFAULT_HOME_PATH.to_string()),
            profile_fetch_timeout,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
