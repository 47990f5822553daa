//! BTC ledger lookup via BlockCypher.
//!
//! Endpoint: `GET {base}/{address}`, bounded by a client-side deadline.
//! All monetary fields are satoshi-denominated integers; conversion to
//! whole-coin units happens at render time.

use std::time::Duration;

use serde::Deserialize;

use overwatch_types::error::{OverwatchError, Result};

use crate::UNKNOWN;
use crate::client::HttpClient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLedger {
    #[serde(default)]
    pub balance: Option<i64>,
    #[serde(default)]
    pub total_received: Option<i64>,
    #[serde(default)]
    pub total_sent: Option<i64>,
    #[serde(default)]
    pub n_tx: Option<u64>,
    #[serde(default)]
    pub unconfirmed_n_tx: Option<u64>,
    #[serde(default)]
    pub txrefs: Vec<RawTxRef>,
    /// BlockCypher reports address problems in-band.
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTxRef {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub confirmed: Option<String>,
}

/// Normalized ledger record. Absent numeric fields default to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerProfile {
    pub address: String,
    pub balance_sat: i64,
    pub total_received_sat: i64,
    pub total_sent_sat: i64,
    pub tx_count: u64,
    pub unconfirmed: u64,
    pub recent: Vec<TxRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxRef {
    pub hash: String,
    pub value_sat: i64,
    pub confirmed: String,
}

pub fn normalize(address: &str, raw: RawLedger) -> Result<LedgerProfile> {
    if let Some(message) = raw.error {
        return Err(OverwatchError::Upstream(format!(
            "LEDGER REJECTED ADDRESS: {message}"
        )));
    }
    Ok(LedgerProfile {
        address: address.to_string(),
        balance_sat: raw.balance.unwrap_or(0),
        total_received_sat: raw.total_received.unwrap_or(0),
        total_sent_sat: raw.total_sent.unwrap_or(0),
        tx_count: raw.n_tx.unwrap_or(0),
        unconfirmed: raw.unconfirmed_n_tx.unwrap_or(0),
        recent: raw
            .txrefs
            .into_iter()
            .map(|t| TxRef {
                hash: t.tx_hash.unwrap_or_else(|| UNKNOWN.to_string()),
                value_sat: t.value.unwrap_or(0),
                confirmed: t.confirmed.unwrap_or_else(|| UNKNOWN.to_string()),
            })
            .collect(),
    })
}

/// Fetch the ledger profile of one address, failing after `timeout`.
pub async fn lookup(
    http: &HttpClient,
    base: &str,
    address: &str,
    timeout: Duration,
) -> Result<LedgerProfile> {
    let url = format!("{base}/{address}");
    match http.try_get_json::<RawLedger>(&url, Some(timeout)).await? {
        Ok(raw) => normalize(address, raw),
        Err(404) => Err(OverwatchError::Upstream(
            "INVALID LEDGER ADDRESS.".to_string(),
        )),
        Err(status) => Err(OverwatchError::Transport(format!("HTTP {status}"))),
    }
}
