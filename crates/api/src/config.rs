//! Gate configuration, loaded from the environment.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tollgate_core::RouteRules;
use tollgate_infra::OracleEndpoints;

/// What the edge does with a status value outside the known lifecycle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStatusPolicy {
    /// Forward-compatible: let the request through and log it.
    #[default]
    Allow,
    /// Fail closed: redirect to the fallback path.
    Deny,
}

impl FromStr for UnknownStatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            other => Err(format!("expected 'allow' or 'deny', got '{other}'")),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

/// Missing fields take their [`Default`] values, so a config file (or the
/// environment, via [`GateConfig::from_env`]) only names what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub backend_url: String,
    #[serde(rename = "oracle_timeout_ms", with = "duration_ms")]
    pub oracle_timeout: Duration,
    pub secure_cookies: bool,
    pub unknown_status: UnknownStatusPolicy,
    pub routes: RouteRules,
    pub endpoints: OracleEndpoints,
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            jwt_secret: "dev-secret".to_string(),
            backend_url: "http://localhost:4000".to_string(),
            oracle_timeout: Duration::from_millis(5000),
            secure_cookies: false,
            unknown_status: UnknownStatusPolicy::Allow,
            routes: RouteRules::default(),
            endpoints: OracleEndpoints::default(),
        }
    }
}

impl GateConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(bind) = lookup("TOLLGATE_BIND") {
            config.bind_addr = bind;
        }

        match lookup("TOLLGATE_JWT_SECRET") {
            Some(secret) if !secret.is_empty() => config.jwt_secret = secret,
            _ => tracing::warn!("TOLLGATE_JWT_SECRET not set; using insecure dev default"),
        }

        if let Some(url) = lookup("TOLLGATE_BACKEND_URL") {
            config.backend_url = url;
        }

        if let Some(raw) = lookup("TOLLGATE_ORACLE_TIMEOUT_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|e| ConfigError {
                var: "TOLLGATE_ORACLE_TIMEOUT_MS",
                reason: e.to_string(),
            })?;
            config.oracle_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("TOLLGATE_SECURE_COOKIES") {
            config.secure_cookies = raw.trim().parse::<bool>().map_err(|e| ConfigError {
                var: "TOLLGATE_SECURE_COOKIES",
                reason: e.to_string(),
            })?;
        }

        if let Some(raw) = lookup("TOLLGATE_UNKNOWN_STATUS") {
            config.unknown_status = raw.parse().map_err(|reason| ConfigError {
                var: "TOLLGATE_UNKNOWN_STATUS",
                reason,
            })?;
        }

        Ok(config)
    }
}
