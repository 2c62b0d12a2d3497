// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{JwksClient, KeySetSource, TokenAuthorizer};
use crate::config::AuthorizerConfig;

pub struct AppState<S = JwksClient> {
    pub authorizer: Arc<TokenAuthorizer<S>>,
}

impl<S: KeySetSource> AppState<S> {
    pub fn new(authorizer: TokenAuthorizer<S>) -> Self {
        Self {
            authorizer: Arc::new(authorizer),
        }
    }
}

impl AppState<JwksClient> {
    pub fn from_config(config: AuthorizerConfig) -> Self {
        Self::new(TokenAuthorizer::from_config(config))
    }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            authorizer: Arc::clone(&self.authorizer),
        }
    }
}
