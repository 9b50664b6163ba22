// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical transfer message encoding.
//!
//! A transfer is authorized by signing a fixed-format text message:
//!
//! ```text
//! Transfer {amount_eth:.6} ETH (${amount_usd} USD) to {to} from {from}
//! ```
//!
//! The signature authenticates only this literal text, so at execute time
//! every semantically relevant field (amount, recipient, sender) is
//! re-extracted from the message and cross-checked against the request.
//! The parser is strict and anchored to the whole string: any leading or
//! trailing bytes, a malformed amount, or a malformed address rejects the
//! message outright.

/// Transfer terms extracted from a canonical message.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferTerms {
    /// Amount in simulated ETH, as embedded in the signed text.
    pub amount_eth: f64,
    /// Recipient address as embedded in the signed text.
    pub to_address: String,
    /// Sender address as embedded in the signed text.
    pub from_address: String,
}

/// Render the canonical message for a prepared transfer.
///
/// `amount_eth` is fixed to 6 decimal places; `amount_usd` is rendered with
/// the shortest `f64` representation (`100` for a whole-dollar amount).
pub fn render(amount_eth: f64, amount_usd: f64, to_address: &str, from_address: &str) -> String {
    format!("Transfer {amount_eth:.6} ETH (${amount_usd} USD) to {to_address} from {from_address}")
}

/// Parse a canonical transfer message, returning `None` unless the entire
/// string matches the grammar produced by [`render`].
pub fn parse(message: &str) -> Option<TransferTerms> {
    let rest = message.strip_prefix("Transfer ")?;
    let (amount_str, rest) = rest.split_once(" ETH ($")?;
    let (usd_str, rest) = rest.split_once(" USD) to ")?;
    let (to_address, from_address) = rest.split_once(" from ")?;

    if !is_plain_decimal(amount_str) || !is_plain_decimal(usd_str) {
        return None;
    }
    if !is_hex_address(to_address) || !is_hex_address(from_address) {
        return None;
    }

    Some(TransferTerms {
        amount_eth: amount_str.parse().ok()?,
        to_address: to_address.to_string(),
        from_address: from_address.to_string(),
    })
}

/// Unsigned decimal: digits with at most one dot. Rejects signs, exponents,
/// and non-numeric spellings like `nan`.
fn is_plain_decimal(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().filter(|c| *c == '.').count() <= 1
}

/// `0x` followed by exactly 40 hex characters.
fn is_hex_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}
