// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use apple_token_authorizer::{
    api::router,
    config::{AuthorizerConfig, ServerConfig},
    state::AppState,
    telemetry,
};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server_config = ServerConfig::from_env()?;
    telemetry::init(server_config.log_format);

    let authorizer_config = AuthorizerConfig::from_env()?;
    info!(
        jwks_url = %authorizer_config.jwks_url,
        audience = %authorizer_config.audience,
        cache_ttl_secs = authorizer_config.jwks_cache_ttl.as_secs(),
        "Loaded authorizer configuration"
    );

    let app = router(AppState::from_config(authorizer_config));

    let listener = TcpListener::bind(server_config.addr).await?;
    info!("Apple token authorizer listening on http://{}", server_config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
