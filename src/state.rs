// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{engine::TransferEngine, ledger::Ledger, oracle::QuoteClient};

/// Shared application state: one ledger handle opened at startup (redb
/// serializes writers internally, so no outer lock is needed) and the
/// transfer engine wired to it.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub engine: TransferEngine,
}

impl AppState {
    pub fn new(ledger: Ledger, oracle: QuoteClient) -> Self {
        let ledger = Arc::new(ledger);
        let engine = TransferEngine::new(ledger.clone(), oracle);
        Self { ledger, engine }
    }
}
