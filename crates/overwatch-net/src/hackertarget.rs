//! Subdomain enumeration via HackerTarget hostsearch.
//!
//! Endpoint: `GET {base}?q={domain}`, returning CSV text lines
//! `host,ip`. Quota and input errors come back as a plain-text message in
//! the body rather than an HTTP error status.

use overwatch_types::error::{OverwatchError, Result};

use crate::client::HttpClient;

/// One discovered subdomain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainRecord {
    pub host: String,
    pub ip: String,
}

/// Parse the CSV body. Lines without exactly one comma-separated pair are
/// dropped; an upstream error message in the body is surfaced as an error.
pub fn parse_hostsearch(body: &str) -> Result<Vec<SubdomainRecord>> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("error") || lowered.starts_with("api count exceeded") {
        return Err(OverwatchError::Upstream(format!(
            "SUBDOMAIN SWEEP REFUSED: {trimmed}"
        )));
    }

    let records: Vec<SubdomainRecord> = trimmed
        .lines()
        .filter_map(|line| {
            let (host, ip) = line.split_once(',')?;
            let host = host.trim();
            let ip = ip.trim();
            if host.is_empty() || ip.is_empty() {
                return None;
            }
            Some(SubdomainRecord {
                host: host.to_string(),
                ip: ip.to_string(),
            })
        })
        .collect();

    if records.is_empty() {
        return Err(OverwatchError::Upstream(
            "SUBDOMAIN SWEEP RETURNED NO PARSEABLE RECORDS.".to_string(),
        ));
    }
    Ok(records)
}

/// Enumerate subdomains of `domain`.
pub async fn enumerate(http: &HttpClient, base: &str, domain: &str) -> Result<Vec<SubdomainRecord>> {
    let url = format!("{base}?q={domain}");
    let body = http.get_text(&url).await?;
    parse_hostsearch(&body)
}
