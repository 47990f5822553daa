//! Breach lookup via XposedOrNot.
//!
//! Endpoint: `GET {base}/{email}`, bounded by a client-side deadline.
//! The `breaches` payload is a nested array; a 404 means the address has
//! no recorded exposure (clean), not a failure.

use std::time::Duration;

use serde::Deserialize;

use overwatch_types::error::{OverwatchError, Result};

use crate::client::HttpClient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBreach {
    #[serde(default)]
    pub breaches: Vec<Vec<String>>,
}

/// Normalized breach record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachReport {
    pub email: String,
    /// Names of leaks the address appears in; empty means clean.
    pub sources: Vec<String>,
}

impl BreachReport {
    pub fn is_clean(&self) -> bool {
        self.sources.is_empty()
    }
}

pub fn normalize(email: &str, raw: RawBreach) -> BreachReport {
    BreachReport {
        email: email.to_string(),
        sources: raw.breaches.into_iter().flatten().collect(),
    }
}

/// Check one email address, failing after `timeout`.
pub async fn check(
    http: &HttpClient,
    base: &str,
    email: &str,
    timeout: Duration,
) -> Result<BreachReport> {
    let url = format!("{base}/{email}");
    match http.try_get_json::<RawBreach>(&url, Some(timeout)).await? {
        Ok(raw) => Ok(normalize(email, raw)),
        Err(404) => Ok(BreachReport {
            email: email.to_string(),
            sources: Vec::new(),
        }),
        Err(status) => Err(OverwatchError::Transport(format!("HTTP {status}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_breach_array_flattens() {
        let raw: RawBreach =
            serde_json::from_str(r#"{"breaches": [["Adobe", "LinkedIn", "Canva"]]}"#).unwrap();
        let report = normalize("user@x.com", raw);
        assert_eq!(report.sources, vec!["Adobe", "LinkedIn", "Canva"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn missing_breaches_field_is_clean() {
        let raw: RawBreach = serde_json::from_str("{}").unwrap();
        let report = normalize("user@x.com", raw);
        assert!(report.is_clean());
    }

    #[test]
    fn multiple_nested_groups_flatten_in_order() {
        let raw: RawBreach =
            serde_json::from_str(r#"{"breaches": [["A", "B"], ["C"]]}"#).unwrap();
        let report = normalize("user@x.com", raw);
        assert_eq!(report.sources, vec!["A", "B", "C"]);
    }
}
