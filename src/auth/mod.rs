// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Module
//!
//! Verifies Sign in with Apple identity tokens for an API gateway.
//!
//! ## Auth Flow
//!
//! 1. The app signs the user in with Apple and receives an identity token
//! 2. The app calls the API with `Authorization: Bearer <identity token>`
//! 3. The gateway hands the header value to this authorizer, which:
//!    - Reads the token's key id without trusting anything else in it
//!    - Fetches Apple's JWKS via HTTPS
//!    - Verifies signature, expiry, issuer and audience
//!    - Extracts `sub` as principal and `email` as forwarded context
//!
//! ## Outcomes
//!
//! - Allow: policy granting the configured resource
//! - Deny: `Unauthorized` (bad, expired or keyless token)
//! - Error: the key set could not be fetched or the key id did not match
//!   exactly one published key

pub mod authorizer;
pub mod claims;
pub mod error;
pub mod jwks;
pub mod policy;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use authorizer::{AuthorizerRequest, Decision, TokenAuthorizer, APPLE_ISSUER};
pub use claims::AppleClaims;
pub use error::AuthError;
pub use jwks::{JwksClient, KeySetSource, APPLE_JWKS_URL};
pub use policy::{AuthResponse, Effect, PolicyDocument, Statement};
