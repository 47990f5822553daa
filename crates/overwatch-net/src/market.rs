//! Market telemetry via the Binance public REST API.
//!
//! Ticker: `GET {base}/ticker/price?symbol={PAIR}` — a rejected symbol
//! comes back as a client-error status, surfaced as "INVALID ASSET PAIR."
//! Candles: `GET {base}/klines?symbol={PAIR}&interval=1m&limit={n}` — rows
//! are positional JSON arrays; malformed rows are dropped.

use serde::Deserialize;
use serde_json::Value;

use overwatch_types::error::{OverwatchError, Result};

use crate::client::HttpClient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTicker {
    #[serde(default)]
    pub price: Option<String>,
}

/// Normalized spot price.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerPrice {
    pub pair: String,
    pub price: f64,
}

/// One 1-minute candle. Only the fields the pipeline consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open_time_ms: i64,
    pub close: f64,
}

pub fn normalize_ticker(pair: &str, raw: RawTicker) -> Result<TickerPrice> {
    let price = raw
        .price
        .as_deref()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(|| OverwatchError::Upstream("INVALID ASSET PAIR.".to_string()))?;
    Ok(TickerPrice {
        pair: pair.to_string(),
        price,
    })
}

/// Fetch the live price for a trading pair.
pub async fn fetch_ticker(http: &HttpClient, base: &str, pair: &str) -> Result<TickerPrice> {
    let url = format!("{base}/ticker/price?symbol={pair}");
    match http.try_get_json::<RawTicker>(&url, None).await? {
        Ok(raw) => normalize_ticker(pair, raw),
        // Binance answers 400 for an unknown symbol.
        Err(status) if (400..500).contains(&status) => {
            Err(OverwatchError::Upstream("INVALID ASSET PAIR.".to_string()))
        }
        Err(status) => Err(OverwatchError::Transport(format!("HTTP {status}"))),
    }
}

/// Fetch the last `limit` 1-minute candles for a pair.
pub async fn fetch_klines(
    http: &HttpClient,
    base: &str,
    pair: &str,
    limit: usize,
) -> Result<Vec<Candle>> {
    let url = format!("{base}/klines?symbol={pair}&interval=1m&limit={limit}");
    let rows: Vec<Vec<Value>> = http.get_json(&url).await?;
    Ok(normalize_klines(rows))
}

/// Kline rows are `[open_time, open, high, low, close, ...]` with string
/// prices. Rows that do not match are skipped.
pub fn normalize_klines(rows: Vec<Vec<Value>>) -> Vec<Candle> {
    rows.into_iter()
        .filter_map(|row| {
            let open_time_ms = row.first()?.as_i64()?;
            let close = match row.get(4)? {
                Value::String(s) => s.parse().ok()?,
                Value::Number(n) => n.as_f64()?,
                _ => return None,
            };
            Some(Candle {
                open_time_ms,
                close,
            })
        })
        .collect()
}
