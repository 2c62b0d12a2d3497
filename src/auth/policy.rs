// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway policy document returned for an allowed request.
//!
//! Field names follow the API Gateway authorizer response format
//! (`principalId`, `policyDocument.Version`, `Statement[].Action` ...).

use serde::{Deserialize, Serialize};

/// IAM policy language version.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Action granted by every statement this authorizer emits.
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Single policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

/// Policy document with a version and its statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    /// Policy with a single `execute-api:Invoke` statement.
    pub fn invoke(effect: Effect, resource: impl Into<String>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                action: INVOKE_ACTION.to_string(),
                effect,
                resource: resource.into(),
            }],
        }
    }
}

/// Values forwarded to the backend alongside the policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Authorizer response handed back to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    pub context: DecisionContext,
}

impl AuthResponse {
    /// Create a response granting (or denying) `execute-api:Invoke` on `resource`.
    pub fn new(principal_id: impl Into<String>, effect: Effect, resource: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument::invoke(effect, resource),
            context: DecisionContext::default(),
        }
    }

    /// Set the forwarded email.
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.context.email = email;
        self
    }

    pub fn effect(&self) -> Option<Effect> {
        self.policy_document.statement.first().map(|s| s.effect)
    }
}
