// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use tracing::info;

use crate::auth::{AuthResponse, AuthorizerRequest, Decision, KeySetSource};
use crate::error::ApiError;
use crate::state::AppState;

/// Authorize a gateway request.
///
/// - Allow: 200 with the policy response
/// - Deny: 401 `Unauthorized`
/// - Hard failure: 5xx with the error message
pub async fn authorize<S: KeySetSource + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<AuthorizerRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    match state.authorizer.authorize(&request).await? {
        Decision::Allow(response) => {
            info!(principal_id = %response.principal_id, "Request allowed");
            Ok(Json(response))
        }
        Decision::Deny => {
            info!(method_arn = %request.method_arn, "Request denied");
            Err(ApiError::unauthorized())
        }
    }
}
