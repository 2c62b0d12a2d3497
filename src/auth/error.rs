// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Hard failures of the authorization flow.
//!
//! A denied token is not an error: it is reported as
//! [`Decision::Deny`](super::Decision::Deny). The variants here cover the
//! cases where no decision could be reached at all, so they propagate to the
//! host instead of being turned into a denial.

use axum::http::StatusCode;

/// Authorization failure that prevents any allow/deny decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The provider key set could not be fetched or parsed.
    #[error("Failed to fetch JWKS: {0}")]
    JwksFetch(String),

    /// Zero or several keys in the provider set carry the token's key id.
    #[error("Key not found")]
    KeyNotFound,

    /// The selected key cannot be turned into a verification key.
    #[error("Unsupported key: {0}")]
    UnsupportedKey(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::JwksFetch(_) => "jwks_fetch_error",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::UnsupportedKey(_) => "unsupported_key",
        }
    }

    /// Get the HTTP status code the host adapter reports for this error.
    ///
    /// Every variant is a server-side failure; the caller was never judged.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::JwksFetch(_) => StatusCode::BAD_GATEWAY,
            AuthError::KeyNotFound | AuthError::UnsupportedKey(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
