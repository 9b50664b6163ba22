// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EthSim Wallet - Simulated Custodial Wallet Service
//!
//! This crate provides a custodial wallet simulation: it issues secp256k1
//! key pairs, tracks simulated ETH balances in an embedded ledger, and
//! executes transfers authorized by EIP-191 signed messages instead of
//! on-chain transactions.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `engine` - Transfer protocol engine (prepare / sign / execute)
//! - `ledger` - Embedded ledger store (redb)
//! - `oracle` - Price quote client with fixed-rate fallback
//! - `signing` - Key generation, EIP-191 signing and recovery

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod message;
pub mod models;
pub mod oracle;
pub mod signing;
pub mod state;
