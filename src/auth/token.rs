// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction and structural decoding.
//!
//! Nothing decoded here is trusted. The header is only read to learn which
//! provider key should verify the token.

use jsonwebtoken::{decode_header, Algorithm, Header};
use serde_json::{Map, Value};

/// Return the part of the header value after the first space.
///
/// The scheme name is not checked. A value without a space yields an empty
/// token, which then fails structural decoding.
pub fn extract_bearer_token(header_value: &str) -> &str {
    header_value
        .split_once(' ')
        .map(|(_, token)| token)
        .unwrap_or("")
}

/// Token whose header and payload parsed, with its signature still unchecked.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    header: Header,
}

impl DecodedToken {
    /// Decode header and payload without verifying the signature.
    ///
    /// Fails when the token is not three base64url segments or when either
    /// the header or the payload is not a JSON object.
    pub fn decode(token: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let header = decode_header(token)?;
        // Payload shape only; the unverified claims are discarded.
        jsonwebtoken::dangerous::insecure_decode::<Map<String, Value>>(token)?;
        Ok(Self { header })
    }

    /// Key id declared in the token header.
    pub fn key_id(&self) -> Option<&str> {
        self.header.kid.as_deref()
    }

    /// Algorithm declared in the token header.
    pub fn algorithm(&self) -> Algorithm {
        self.header.alg
    }
}
