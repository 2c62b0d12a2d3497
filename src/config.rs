// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUDIENCE` | Expected `aud` claim (the app's bundle id) | Required |
//! | `ALLOW_RESOURCE_ARN` | Resource granted in the allow policy | Required |
//! | `JWKS_URL` | Provider JWKS endpoint | `https://appleid.apple.com/auth/keys` |
//! | `JWKS_CACHE_TTL_SECONDS` | Key set cache TTL, `0` fetches on every request | `0` |
//! | `CLOCK_SKEW_LEEWAY_SECONDS` | Leeway applied to `exp` | `0` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::auth::jwks::APPLE_JWKS_URL;

/// Environment variable name for the expected audience.
pub const AUDIENCE_ENV: &str = "AUDIENCE";

/// Environment variable name for the resource placed in the allow policy.
///
/// The caller's `methodArn` is never echoed back; the granted resource comes
/// from deployment.
pub const ALLOW_RESOURCE_ARN_ENV: &str = "ALLOW_RESOURCE_ARN";

/// Environment variable name overriding the JWKS endpoint.
pub const JWKS_URL_ENV: &str = "JWKS_URL";

/// Environment variable name for the key set cache TTL in seconds.
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECONDS";

/// Environment variable name for the expiry leeway in seconds.
pub const CLOCK_SKEW_LEEWAY_ENV: &str = "CLOCK_SKEW_LEEWAY_SECONDS";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Configuration error.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("invalid configuration {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings of the token authorizer itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerConfig {
    /// Expected `aud` claim
    pub audience: String,
    /// Resource granted on allow
    pub allow_resource_arn: String,
    /// JWKS endpoint
    pub jwks_url: String,
    /// Key set cache TTL (zero disables the cache)
    pub jwks_cache_ttl: Duration,
    /// Leeway in seconds for time based claims
    pub leeway_seconds: u64,
}

impl AuthorizerConfig {
    /// Config with Apple's endpoint and no cache or leeway.
    pub fn new(audience: impl Into<String>, allow_resource_arn: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            allow_resource_arn: allow_resource_arn.into(),
            jwks_url: APPLE_JWKS_URL.to_string(),
            jwks_cache_ttl: Duration::ZERO,
            leeway_seconds: 0,
        }
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let audience = required(&lookup, AUDIENCE_ENV)?;
        let allow_resource_arn = required(&lookup, ALLOW_RESOURCE_ARN_ENV)?;

        let jwks_url = match lookup(JWKS_URL_ENV).filter(|v| !v.trim().is_empty()) {
            Some(url) => validate_jwks_url(url.trim())?,
            None => APPLE_JWKS_URL.to_string(),
        };

        let jwks_cache_ttl = Duration::from_secs(parse_u64(&lookup, JWKS_CACHE_TTL_ENV)?);
        let leeway_seconds = parse_u64(&lookup, CLOCK_SKEW_LEEWAY_ENV)?;

        Ok(Self {
            audience,
            allow_resource_arn,
            jwks_url,
            jwks_cache_ttl,
            leeway_seconds,
        })
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Settings of the HTTP host adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(port) => port.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: HOST_ENV,
                reason: e.to_string(),
            })?;

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self { addr, log_format })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_u64<F>(lookup: &F, key: &'static str) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(value) => value.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        }),
        None => Ok(0),
    }
}

/// JWKS must be fetched over HTTPS; plain HTTP is accepted for loopback only.
fn validate_jwks_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: JWKS_URL_ENV,
        reason: e.to_string(),
    })?;

    let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
    match url.scheme() {
        "https" => Ok(url.to_string()),
        "http" if loopback => Ok(url.to_string()),
        scheme => Err(ConfigError::Invalid {
            key: JWKS_URL_ENV,
            reason: format!("scheme {scheme} is not allowed"),
        }),
    }
}
