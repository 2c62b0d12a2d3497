// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and key selection.
//!
//! ## Security
//!
//! - The key set is fetched on every authorization unless a cache TTL is
//!   configured explicitly
//! - With a cache, a key id missing from the cached set forces a fresh
//!   fetch before the lookup is declared failed
//! - A key id must match exactly one published key; duplicates are never
//!   disambiguated

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;
use tracing::debug;

use super::error::AuthError;

/// Apple's published signing keys.
pub const APPLE_JWKS_URL: &str = "https://appleid.apple.com/auth/keys";

/// Source of the identity provider's current key set.
pub trait KeySetSource: Send + Sync {
    /// Return the provider key set, possibly from a cache.
    fn fetch_key_set(&self) -> impl Future<Output = Result<JwkSet, AuthError>> + Send;

    /// Return the provider key set, bypassing any cache.
    fn refresh_key_set(&self) -> impl Future<Output = Result<JwkSet, AuthError>> + Send {
        self.fetch_key_set()
    }

    /// Whether [`fetch_key_set`](Self::fetch_key_set) may serve a cached set.
    fn caches(&self) -> bool {
        false
    }
}

/// JWKS cache entry.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// HTTP client for the provider JWKS endpoint.
///
/// Without a cache TTL every call goes to the network.
#[derive(Clone)]
pub struct JwksClient {
    /// JWKS URL
    jwks_url: String,
    /// Cache TTL (`None` disables caching)
    cache_ttl: Option<Duration>,
    /// Cached JWKS
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksClient {
    /// Create a client for the given JWKS endpoint.
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: None,
            cache: Arc::new(RwLock::new(None)),
            client: reqwest::Client::new(),
        }
    }

    /// Enable caching with the given TTL. A zero TTL keeps caching off.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = (!ttl.is_zero()).then_some(ttl);
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_remote(&self) -> Result<JwkSet, AuthError> {
        debug!(url = %self.jwks_url, "Fetching provider key set");

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksFetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        debug!(keys = jwks.keys.len(), "Fetched provider key set");
        Ok(jwks)
    }

    async fn store(&self, jwks: &JwkSet) {
        if self.cache_ttl.is_some() {
            let mut cache = self.cache.write().await;
            *cache = Some(CacheEntry {
                jwks: jwks.clone(),
                fetched_at: Instant::now(),
            });
        }
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        let Some(ttl) = self.cache_ttl else {
            return false;
        };
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .map(|entry| entry.fetched_at.elapsed() < ttl)
            .unwrap_or(false)
    }
}

impl KeySetSource for JwksClient {
    async fn fetch_key_set(&self) -> Result<JwkSet, AuthError> {
        if let Some(ttl) = self.cache_ttl {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_remote().await?;
        self.store(&jwks).await;
        Ok(jwks)
    }

    async fn refresh_key_set(&self) -> Result<JwkSet, AuthError> {
        let jwks = self.fetch_remote().await?;
        self.store(&jwks).await;
        Ok(jwks)
    }

    fn caches(&self) -> bool {
        self.cache_ttl.is_some()
    }
}

/// Select the single key whose `kid` equals `kid`.
pub fn select_key<'a>(jwks: &'a JwkSet, kid: &str) -> Result<&'a Jwk, AuthError> {
    let mut matching = jwks
        .keys
        .iter()
        .filter(|k| k.common.key_id.as_deref() == Some(kid));

    match (matching.next(), matching.next()) {
        (Some(jwk), None) => Ok(jwk),
        _ => Err(AuthError::KeyNotFound),
    }
}

/// Convert a JWK to a DecodingKey and the algorithm it verifies.
pub fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|e| AuthError::UnsupportedKey(format!("Failed to create RSA key: {e}")))?;

            let alg = match jwk.common.key_algorithm {
                None | Some(KeyAlgorithm::RS256) => Algorithm::RS256,
                Some(KeyAlgorithm::RS384) => Algorithm::RS384,
                Some(KeyAlgorithm::RS512) => Algorithm::RS512,
                Some(KeyAlgorithm::PS256) => Algorithm::PS256,
                Some(KeyAlgorithm::PS384) => Algorithm::PS384,
                Some(KeyAlgorithm::PS512) => Algorithm::PS512,
                Some(other) => {
                    return Err(AuthError::UnsupportedKey(format!(
                        "RSA key with algorithm {other:?}"
                    )))
                }
            };

            Ok((key, alg))
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            let default_alg = match ec.curve {
                EllipticCurve::P256 => Algorithm::ES256,
                EllipticCurve::P384 => Algorithm::ES384,
                ref curve => {
                    return Err(AuthError::UnsupportedKey(format!(
                        "EC key on curve {curve:?}"
                    )))
                }
            };

            let key = DecodingKey::from_ec_components(&ec.x, &ec.y)
                .map_err(|e| AuthError::UnsupportedKey(format!("Failed to create EC key: {e}")))?;

            let alg = match jwk.common.key_algorithm {
                None => default_alg,
                Some(KeyAlgorithm::ES256) if default_alg == Algorithm::ES256 => Algorithm::ES256,
                Some(KeyAlgorithm::ES384) if default_alg == Algorithm::ES384 => Algorithm::ES384,
                Some(other) => {
                    return Err(AuthError::UnsupportedKey(format!(
                        "EC key on curve {:?} with algorithm {other:?}",
                        ec.curve
                    )))
                }
            };

            Ok((key, alg))
        }
        _ => Err(AuthError::UnsupportedKey(
            "Unsupported key type in JWKS".to_string(),
        )),
    }
}
