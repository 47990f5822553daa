//! Port / CVE exposure via Shodan InternetDB.
//!
//! Endpoint: `GET {base}/{ip}`. A 404 means the address has no recorded
//! exposure, which is a result, not a failure.

use serde::Deserialize;

use overwatch_types::error::{OverwatchError, Result};

use crate::client::HttpClient;

/// Exposure record for one address. All sections default to empty.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExposureReport {
    #[serde(default)]
    pub hostnames: Vec<String>,
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub cpes: Vec<String>,
    #[serde(default)]
    pub vulns: Vec<String>,
}

impl ExposureReport {
    pub fn is_empty(&self) -> bool {
        self.hostnames.is_empty()
            && self.ports.is_empty()
            && self.cpes.is_empty()
            && self.vulns.is_empty()
    }
}

/// Query exposure for one IPv4 address.
pub async fn lookup(http: &HttpClient, base: &str, ip: &str) -> Result<ExposureReport> {
    let url = format!("{base}/{ip}");
    match http.try_get_json::<ExposureReport>(&url, None).await? {
        Ok(report) => Ok(report),
        Err(404) => Ok(ExposureReport::default()),
        Err(status) => Err(OverwatchError::Transport(format!("HTTP {status}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_record_parses() {
        let report: ExposureReport = serde_json::from_str(
            r#"{
                "hostnames": ["dns.google"],
                "ports": [53, 443],
                "cpes": ["cpe:/a:isc:bind"],
                "vulns": ["CVE-2023-1234"]
            }"#,
        )
        .unwrap();
        assert_eq!(report.hostnames, vec!["dns.google"]);
        assert_eq!(report.ports, vec![53, 443]);
        assert!(!report.is_empty());
    }

    #[test]
    fn sparse_record_defaults_to_empty_sections() {
        let report: ExposureReport = serde_json::from_str(r#"{"ports": [22]}"#).unwrap();
        assert!(report.hostnames.is_empty());
        assert!(report.vulns.is_empty());
        assert_eq!(report.ports, vec![22]);
    }

    #[test]
    fn empty_object_is_empty_report() {
        let report: ExposureReport = serde_json::from_str("{}").unwrap();
        assert!(report.is_empty());
    }
}
