// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, path::Path};

use tracing_subscriber::EnvFilter;

use ethsim_wallet_server::{
    api::router,
    config::{DATA_DIR_ENV, HOST_ENV, PORT_ENV},
    ledger::Ledger,
    oracle::QuoteClient,
    state::AppState,
};

#[tokio::main]
async fn main() {
    init_tracing();

    // Open (or create) the ledger database before binding the socket.
    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| "data".to_string());
    let ledger = Ledger::open(&Path::new(&data_dir).join("wallet.redb"))
        .expect("Failed to open ledger database");

    let oracle = QuoteClient::from_env().expect("Failed to configure quote client");

    let state = AppState::new(ledger, oracle);
    let app = router(state);

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!(%addr, "EthSim Wallet server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

/// Initialize tracing from `RUST_LOG` and `LOG_FORMAT` (`json` or `pretty`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to install ctrl-c handler");
    }
}
