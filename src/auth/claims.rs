// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims carried by a Sign in with Apple identity token.

use serde::Deserialize;

/// Claims extracted from a verified Apple identity token.
///
/// Only ever produced by signature verification; structural decoding never
/// yields this type.
/// See: https://developer.apple.com/documentation/sign_in_with_apple/authenticating-users-with-sign-in-with-apple
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppleClaims {
    /// Subject (stable Apple user identifier)
    pub sub: String,

    /// User email (relay address when the user hides their email)
    #[serde(default)]
    pub email: Option<String>,

    /// Audience (the app's bundle / services id)
    #[serde(default)]
    pub aud: Option<Audience>,

    /// Issuer (always `https://appleid.apple.com` once verified)
    #[serde(default)]
    pub iss: Option<String>,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: Option<i64>,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: Option<i64>,

    /// Whether Apple verified the email
    #[serde(default)]
    pub email_verified: Option<Flag>,

    /// Whether the email is a private relay address
    #[serde(default)]
    pub is_private_email: Option<Flag>,
}

/// `aud` is a single string for Apple, but JWT allows an array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(aud) => aud == audience,
            Audience::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Boolean claim Apple emits either as `true` or as `"true"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    pub fn as_bool(&self) -> bool {
        match self {
            Flag::Bool(value) => *value,
            Flag::Text(text) => text.eq_ignore_ascii_case("true"),
        }
    }
}

impl AppleClaims {
    /// True when the email claim is present and Apple marked it verified.
    pub fn has_verified_email(&self) -> bool {
        self.email.is_some()
            && self
                .email_verified
                .as_ref()
                .map(Flag::as_bool)
                .unwrap_or(false)
    }
}
