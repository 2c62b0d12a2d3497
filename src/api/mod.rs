// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth::KeySetSource, state::AppState};

pub mod authorize;
pub mod health;

pub fn router<S: KeySetSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/authorize", post(authorize::authorize::<S>))
        .route("/health", get(health::liveness))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
