// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Price oracle client for USD → ETH conversion.
//!
//! Wraps an external quote endpoint behind a narrow interface. The upstream
//! request uses a fixed USDC → native-ETH asset pair; only the `amount_out`
//! field of the response is consumed. Any failure — transport error,
//! non-200 status, missing or unparseable field — degrades to a fixed
//! conversion rate instead of surfacing an error to the caller.

use std::env;

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::{FALLBACK_USD_PER_ETH, QUOTE_API_URL_ENV, QUOTE_TIMEOUT};

const DEFAULT_QUOTE_API_URL: &str = "https://api.cypherd.io/v2/quote/";

/// USDC contract on Ethereum mainnet, the fixed source asset of every quote.
const SOURCE_ASSET_DENOM: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const DEST_ASSET_DENOM: &str = "ethereum-native";
const CHAIN_ID: &str = "1";

const WEI_PER_ETH: f64 = 1e18;
const USD_MINOR_UNITS: f64 = 1e6;

/// Internal failure modes of a quote attempt. Never escapes [`QuoteClient::quote_usd_to_eth`];
/// logged and recovered via the fallback rate.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("quote endpoint URL is invalid: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("quote request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("quote service returned status {0}")]
    Status(u16),

    #[error("quote response missing amount_out")]
    MissingAmountOut,

    #[error("quote response amount_out was not numeric: {0}")]
    MalformedAmountOut(String),
}

/// HTTP client for the external price-quote service.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    endpoint: String,
    http: Client,
}

impl QuoteClient {
    /// Build a client for the given quote endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, QuoteError> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint)?;

        let http = Client::builder().timeout(QUOTE_TIMEOUT).build()?;

        Ok(Self { endpoint, http })
    }

    /// Build a client from `QUOTE_API_URL`, defaulting to the public endpoint.
    pub fn from_env() -> Result<Self, QuoteError> {
        let endpoint =
            env::var(QUOTE_API_URL_ENV).unwrap_or_else(|_| DEFAULT_QUOTE_API_URL.to_string());
        Self::new(endpoint)
    }

    /// Convert a USD amount into simulated ETH.
    ///
    /// Asks the quote service first; on any failure falls back to
    /// `amount_usd / FALLBACK_USD_PER_ETH`. This is a degraded-but-available
    /// path, not an error condition — the method never fails.
    pub async fn quote_usd_to_eth(&self, amount_usd: f64, from_address: &str) -> f64 {
        match self.fetch_quote(amount_usd, from_address).await {
            Ok(amount_eth) => amount_eth,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    amount_usd,
                    "Quote service unavailable, applying fallback rate"
                );
                amount_usd / FALLBACK_USD_PER_ETH
            }
        }
    }

    async fn fetch_quote(&self, amount_usd: f64, from_address: &str) -> Result<f64, QuoteError> {
        // amount_in is USD expressed in USDC minor units (6 decimals).
        let amount_in = format!("{}", (amount_usd * USD_MINOR_UNITS) as u64);

        let body = json!({
            "source_asset_denom": SOURCE_ASSET_DENOM,
            "source_asset_chain_id": CHAIN_ID,
            "dest_asset_denom": DEST_ASSET_DENOM,
            "dest_asset_chain_id": CHAIN_ID,
            "amount_in": amount_in,
            "chain_ids_to_addresses": {
                CHAIN_ID: from_address
            },
            "slippage_tolerance_percent": "1",
            "smart_swap_options": {
                "evm_swaps": true
            },
            "allow_unsafe": false
        });

        let response = self.http.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status.as_u16()));
        }

        let quote: Value = response.json().await?;
        let amount_out = quote.get("amount_out").ok_or(QuoteError::MissingAmountOut)?;

        // The upstream encodes the output amount in wei, as a string or number.
        let wei = match amount_out {
            Value::String(s) => s
                .parse::<f64>()
                .map_err(|_| QuoteError::MalformedAmountOut(s.clone()))?,
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| QuoteError::MalformedAmountOut(n.to_string()))?,
            other => return Err(QuoteError::MalformedAmountOut(other.to_string())),
        };

        Ok(wei / WEI_PER_ETH)
    }
}
