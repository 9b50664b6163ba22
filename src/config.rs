// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names, default values, and the
//! protocol constants used throughout the application. Configuration is
//! loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the ledger database | `data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `QUOTE_API_URL` | Price oracle quote endpoint | `https://api.cypherd.io/v2/quote/` |
//! | `STATIC_DIR` | Directory served for the demo UI | `static` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

/// Environment variable name for the ledger data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the price oracle quote endpoint.
pub const QUOTE_API_URL_ENV: &str = "QUOTE_API_URL";

/// Environment variable name for the static demo UI directory.
pub const STATIC_DIR_ENV: &str = "STATIC_DIR";

/// Balance credited to every newly created wallet, in simulated ETH.
pub const STARTING_BALANCE_ETH: f64 = 5.0;

/// USD per ETH conversion applied when the price oracle is unreachable.
pub const FALLBACK_USD_PER_ETH: f64 = 2000.0;

/// Maximum tolerated difference between the amount in an execute request
/// and the amount embedded in the signed message.
pub const AMOUNT_TOLERANCE_ETH: f64 = 1e-6;

/// Timeout applied to every price oracle request.
pub const QUOTE_TIMEOUT: Duration = Duration::from_secs(10);
