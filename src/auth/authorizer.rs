// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token authorizer: bearer token in, allow/deny decision out.
//!
//! ## Flow
//!
//! 1. Take the token after the first space of the header value
//! 2. Decode header and payload without verifying; no key id means Deny
//!    before any network call
//! 3. Fetch the provider key set (failure propagates)
//! 4. Select the single key with the token's key id (`Key not found`
//!    propagates)
//! 5. Verify signature, issuer, audience and expiry; any failure is Deny
//! 6. Allow with the verified `sub` as principal and the configured resource

use std::fmt;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, error, warn};

use super::claims::AppleClaims;
use super::error::AuthError;
use super::jwks::{jwk_to_decoding_key, select_key, JwksClient, KeySetSource};
use super::policy::{AuthResponse, Effect};
use super::token::{extract_bearer_token, DecodedToken};
use crate::config::AuthorizerConfig;

/// Issuer of every Sign in with Apple identity token.
pub const APPLE_ISSUER: &str = "https://appleid.apple.com";

/// Claims that must be present for a token to verify.
const REQUIRED_CLAIMS: [&str; 4] = ["exp", "iss", "aud", "sub"];

/// Request as sent by the gateway's token authorizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    /// Full authorization header value, e.g. `Bearer <token>`
    pub authorization_token: String,
    /// Resource the caller asked for
    pub method_arn: String,
}

impl AuthorizerRequest {
    pub fn new(authorization_token: impl Into<String>, method_arn: impl Into<String>) -> Self {
        Self {
            authorization_token: authorization_token.into(),
            method_arn: method_arn.into(),
        }
    }
}

/// Outcome of an authorization that reached a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(AuthResponse),
    /// Reported to the gateway as `Unauthorized`.
    Deny,
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow(_) => write!(f, "Allow"),
            Decision::Deny => write!(f, "Unauthorized"),
        }
    }
}

/// Verifies provider identity tokens and builds access decisions.
pub struct TokenAuthorizer<S> {
    source: S,
    config: AuthorizerConfig,
}

impl TokenAuthorizer<JwksClient> {
    /// Authorizer fetching keys over HTTP as configured.
    pub fn from_config(config: AuthorizerConfig) -> Self {
        let source = JwksClient::new(config.jwks_url.clone()).with_cache_ttl(config.jwks_cache_ttl);
        Self::new(source, config)
    }
}

impl<S: KeySetSource> TokenAuthorizer<S> {
    pub fn new(source: S, config: AuthorizerConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &AuthorizerConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Authorize a single request.
    ///
    /// Returns `Ok(Decision::Deny)` for tokens that are malformed, carry no
    /// key id or fail verification.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the key set cannot be fetched, when the
    /// key id matches zero or several keys, or when the matching key is
    /// unusable. No decision is made in those cases.
    #[tracing::instrument(skip_all, fields(method_arn = %request.method_arn))]
    pub async fn authorize(&self, request: &AuthorizerRequest) -> Result<Decision, AuthError> {
        let token = extract_bearer_token(&request.authorization_token);

        let decoded = match DecodedToken::decode(token) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(reason = ?e.kind(), "Token is malformed");
                return Ok(Decision::Deny);
            }
        };

        let Some(kid) = decoded.key_id() else {
            debug!("Token header has no key id");
            return Ok(Decision::Deny);
        };

        let (decoding_key, algorithm) = match self.resolve_key(kid).await {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(error = %e, error_code = e.error_code(), kid, "Unable to resolve verification key");
                return Err(e);
            }
        };

        // A header `alg` differing from the key's algorithm fails validation.
        let claims = match decode::<AppleClaims>(token, &decoding_key, &self.validation(algorithm)) {
            Ok(data) => data.claims,
            Err(e) => {
                warn!(reason = ?e.kind(), kid, "Token verification failed");
                return Ok(Decision::Deny);
            }
        };

        debug!(principal_id = %claims.sub, "Token verified");
        Ok(Decision::Allow(self.allow(claims)))
    }

    /// Fetch the key set and derive the key for `kid`.
    ///
    /// With a caching source a miss triggers one fresh fetch, so a rotated
    /// key is never reported missing because of a stale cache.
    async fn resolve_key(&self, kid: &str) -> Result<(DecodingKey, Algorithm), AuthError> {
        let key_set = self.source.fetch_key_set().await?;

        match select_key(&key_set, kid) {
            Ok(jwk) => jwk_to_decoding_key(jwk),
            Err(AuthError::KeyNotFound) if self.source.caches() => {
                debug!(kid, "Key id not in cached key set, refreshing");
                let fresh = self.source.refresh_key_set().await?;
                jwk_to_decoding_key(select_key(&fresh, kid)?)
            }
            Err(e) => Err(e),
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[APPLE_ISSUER]);
        validation.set_audience(&[&self.config.audience]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        validation.validate_exp = true;
        validation.leeway = self.config.leeway_seconds;
        validation
    }

    fn allow(&self, claims: AppleClaims) -> AuthResponse {
        AuthResponse::new(claims.sub, Effect::Allow, &self.config.allow_resource_arn)
            .with_email(claims.email)
    }
}
