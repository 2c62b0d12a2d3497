// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared test helpers: fixture keys, signed tokens and an in-memory key set.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use super::error::AuthError;
use super::jwks::KeySetSource;

pub const TEST_AUDIENCE: &str = "com.example.unittest";
pub const TEST_ALLOW_RESOURCE: &str = "arn:test-resource";
pub const TEST_METHOD_ARN: &str = "arn:abcdefg";

const SIGNING_KEY_PEM: &str = include_str!("../../tests/fixtures/apple_test_key.pem");
const SIGNING_JWK: &str = include_str!("../../tests/fixtures/apple_test_key.jwk.json");
const ROGUE_KEY_PEM: &str = include_str!("../../tests/fixtures/rogue_key.pem");
const ROGUE_JWK: &str = include_str!("../../tests/fixtures/rogue_key.jwk.json");

/// Public JWK with kid `testKid`.
pub fn signing_jwk() -> Jwk {
    serde_json::from_str(SIGNING_JWK).unwrap()
}

/// Public JWK with kid `rogueKid`, unrelated to the signing key.
pub fn rogue_jwk() -> Jwk {
    serde_json::from_str(ROGUE_JWK).unwrap()
}

pub fn static_key_set(keys: Vec<Jwk>) -> JwkSet {
    JwkSet { keys }
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Claims of a valid Apple identity token for the test audience.
pub fn apple_claims() -> Value {
    json!({
        "iss": "https://appleid.apple.com",
        "aud": TEST_AUDIENCE,
        "exp": now() + 600,
        "iat": now(),
        "sub": "testSub",
        "email": "testEmail"
    })
}

/// RS256 token signed with the fixture key matching `signing_jwk`.
pub fn signed_token(kid: Option<&str>, claims: &Value) -> String {
    sign_with(SIGNING_KEY_PEM, kid, claims)
}

/// RS256 token signed with the rogue key.
pub fn rogue_signed_token(kid: Option<&str>, claims: &Value) -> String {
    sign_with(ROGUE_KEY_PEM, kid, claims)
}

fn sign_with(pem: &str, kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Key set source serving a fixed set and counting fetches.
pub struct StaticKeySource {
    result: Result<JwkSet, AuthError>,
    calls: AtomicUsize,
}

impl StaticKeySource {
    pub fn new(keys: Vec<Jwk>) -> Self {
        Self {
            result: Ok(static_key_set(keys)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: AuthError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeySetSource for StaticKeySource {
    async fn fetch_key_set(&self) -> Result<JwkSet, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Caching source whose cached set differs from what a refresh returns.
pub struct RotatingKeySource {
    cached: JwkSet,
    fresh: JwkSet,
    fetches: AtomicUsize,
    refreshes: AtomicUsize,
}

impl RotatingKeySource {
    pub fn new(cached: Vec<Jwk>, fresh: Vec<Jwk>) -> Self {
        Self {
            cached: static_key_set(cached),
            fresh: static_key_set(fresh),
            fetches: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl KeySetSource for RotatingKeySource {
    async fn fetch_key_set(&self) -> Result<JwkSet, AuthError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.cached.clone())
    }

    async fn refresh_key_set(&self) -> Result<JwkSet, AuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(self.fresh.clone())
    }

    fn caches(&self) -> bool {
        true
    }
}
