// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Helpers shared by the integration tests: a mock JWKS endpoint and
//! tokens signed with the fixture keys.

#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use apple_token_authorizer::auth::{AuthorizerRequest, TokenAuthorizer};
use apple_token_authorizer::config::AuthorizerConfig;
use apple_token_authorizer::auth::JwksClient;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const AUDIENCE: &str = "com.example.unittest";
pub const ALLOW_RESOURCE_ARN: &str = "arn:test-resource";
pub const METHOD_ARN: &str = "arn:abcdefg";
pub const JWKS_PATH: &str = "/auth/keys";

const SIGNING_KEY_PEM: &str = include_str!("../fixtures/apple_test_key.pem");
const SIGNING_JWK: &str = include_str!("../fixtures/apple_test_key.jwk.json");
const ROGUE_KEY_PEM: &str = include_str!("../fixtures/rogue_key.pem");
const ROGUE_JWK: &str = include_str!("../fixtures/rogue_key.jwk.json");

pub fn signing_jwk() -> Value {
    serde_json::from_str(SIGNING_JWK).unwrap()
}

pub fn rogue_jwk() -> Value {
    serde_json::from_str(ROGUE_JWK).unwrap()
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

pub fn apple_claims() -> Value {
    json!({
        "iss": "https://appleid.apple.com",
        "aud": AUDIENCE,
        "exp": now() + 600,
        "iat": now(),
        "sub": "testSub",
        "email": "testEmail",
        "email_verified": "true"
    })
}

pub fn signed_token(kid: Option<&str>, claims: &Value) -> String {
    sign_with(SIGNING_KEY_PEM, kid, claims)
}

pub fn rogue_signed_token(kid: Option<&str>, claims: &Value) -> String {
    sign_with(ROGUE_KEY_PEM, kid, claims)
}

fn sign_with(pem: &str, kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

pub fn bearer(token: &str) -> AuthorizerRequest {
    AuthorizerRequest::new(format!("Bearer {token}"), METHOD_ARN)
}

/// Mock identity provider publishing a JWKS document.
pub struct MockProvider {
    pub server: MockServer,
}

impl MockProvider {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn jwks_url(&self) -> String {
        format!("{}{}", self.server.uri(), JWKS_PATH)
    }

    /// Serve `keys` on the JWKS path.
    pub async fn publish(&self, keys: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": keys })))
            .mount(&self.server)
            .await;
    }

    /// Respond on the JWKS path with `status` and an empty body.
    pub async fn fail_with(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn jwks_requests(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| {
                requests
                    .iter()
                    .filter(|r| r.url.path() == JWKS_PATH)
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn config(&self) -> AuthorizerConfig {
        let mut config = AuthorizerConfig::new(AUDIENCE, ALLOW_RESOURCE_ARN);
        config.jwks_url = self.jwks_url();
        config
    }

    pub fn authorizer(&self) -> TokenAuthorizer<JwksClient> {
        TokenAuthorizer::from_config(self.config())
    }
}
