//! Runtime configuration, loadable from `overwatch.toml`.
//!
//! Every knob has a serde default so a partial (or absent) file works.

use std::path::Path;

use serde::Deserialize;

use crate::error::{OverwatchError, Result};

/// Top-level configuration for the OVERWATCH kernel.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OverwatchConfig {
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Base URLs of the upstream feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoints {
    /// IP geolocation (geojs), `{base}/{ip}.json`.
    #[serde(default = "default_geo")]
    pub geo: String,
    /// DNS-over-HTTPS resolver (dns.google), `{base}?name=..&type=..`.
    #[serde(default = "default_dns")]
    pub dns: String,
    /// Market data (Binance REST v3 base).
    #[serde(default = "default_market")]
    pub market: String,
    /// Port/CVE exposure (Shodan InternetDB), `{base}/{ip}`.
    #[serde(default = "default_internetdb")]
    pub internetdb: String,
    /// Subdomain enumeration (HackerTarget hostsearch), `{base}?q={domain}`.
    #[serde(default = "default_hostsearch")]
    pub hostsearch: String,
    /// Breach lookup (XposedOrNot), `{base}/{email}`.
    #[serde(default = "default_breach")]
    pub breach: String,
    /// BTC ledger (BlockCypher), `{base}/{address}`.
    #[serde(default = "default_ledger")]
    pub ledger: String,
    /// Seismic feed (USGS GeoJSON summary), complete URL.
    #[serde(default = "default_quakes")]
    pub quakes: String,
    /// Repository search (GitHub), `{base}?q=..`.
    #[serde(default = "default_repos")]
    pub repos: String,
}

fn default_geo() -> String {
    "https://get.geojs.io/v1/ip/geo".to_string()
}

fn default_dns() -> String {
    "https://dns.google/resolve".to_string()
}

fn default_market() -> String {
    "https://api.binance.com/api/v3".to_string()
}

fn default_internetdb() -> String {
    "https://internetdb.shodan.io".to_string()
}

fn default_hostsearch() -> String {
    "https://api.hackertarget.com/hostsearch/".to_string()
}

fn default_breach() -> String {
    "https://api.xposedornot.com/v1/check-email".to_string()
}

fn default_ledger() -> String {
    "https://api.blockcypher.com/v1/btc/main/addrs".to_string()
}

fn default_quakes() -> String {
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_day.geojson".to_string()
}

fn default_repos() -> String {
    "https://api.github.com/search/repositories".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geo: default_geo(),
            dns: default_dns(),
            market: default_market(),
            internetdb: default_internetdb(),
            hostsearch: default_hostsearch(),
            breach: default_breach(),
            ledger: default_ledger(),
            quakes: default_quakes(),
            repos: default_repos(),
        }
    }
}

/// HTTP client behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Default per-request deadline.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Tighter deadline for the bounded protocols (breach, ledger).
    #[serde(default = "default_bounded_timeout")]
    pub bounded_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_timeout() -> u64 {
    15
}

fn default_bounded_timeout() -> u64 {
    8
}

fn default_user_agent() -> String {
    "overwatch/0.1".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            bounded_timeout_secs: default_bounded_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Fan-out pacing for the orchestration macros.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Minimum gap between sequential trace calls (`scan`).
    #[serde(default = "default_trace_delay")]
    pub trace_delay_ms: u64,
    /// Parallel batch width (`dossier` host trace / exposure).
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_trace_delay() -> u64 {
    350
}

fn default_max_in_flight() -> usize {
    4
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            trace_delay_ms: default_trace_delay(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Display caps for long result lists.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_subdomain_cap")]
    pub subdomain_cap: usize,
    #[serde(default = "default_breach_cap")]
    pub breach_cap: usize,
    #[serde(default = "default_vuln_cap")]
    pub vuln_cap: usize,
    #[serde(default = "default_quake_cap")]
    pub quake_cap: usize,
    #[serde(default = "default_repo_cap")]
    pub repo_cap: usize,
    #[serde(default = "default_tx_cap")]
    pub tx_cap: usize,
}

fn default_subdomain_cap() -> usize {
    15
}

fn default_breach_cap() -> usize {
    10
}

fn default_vuln_cap() -> usize {
    5
}

fn default_quake_cap() -> usize {
    10
}

fn default_repo_cap() -> usize {
    10
}

fn default_tx_cap() -> usize {
    5
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            subdomain_cap: default_subdomain_cap(),
            breach_cap: default_breach_cap(),
            vuln_cap: default_vuln_cap(),
            quake_cap: default_quake_cap(),
            repo_cap: default_repo_cap(),
            tx_cap: default_tx_cap(),
        }
    }
}

/// Parse a configuration from TOML text.
pub fn parse_config(toml_str: &str) -> Result<OverwatchConfig> {
    toml::from_str(toml_str).map_err(|e| OverwatchError::Config(format!("overwatch.toml: {e}")))
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. Malformed TOML is an error, not a silent fallback.
pub fn load_config(path: &Path) -> Result<OverwatchConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(OverwatchConfig::default()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.endpoints.geo, "https://get.geojs.io/v1/ip/geo");
        assert_eq!(cfg.http.bounded_timeout_secs, 8);
        assert_eq!(cfg.pacing.trace_delay_ms, 350);
        assert_eq!(cfg.display.subdomain_cap, 15);
        assert_eq!(cfg.display.breach_cap, 10);
        assert_eq!(cfg.display.vuln_cap, 5);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = parse_config(
            r#"
[pacing]
trace_delay_ms = 100
"#,
        )
        .unwrap();
        assert_eq!(cfg.pacing.trace_delay_ms, 100);
        assert_eq!(cfg.pacing.max_in_flight, 4);
        assert_eq!(cfg.http.request_timeout_secs, 15);
    }

    #[test]
    fn endpoint_override() {
        let cfg = parse_config(
            r#"
[endpoints]
geo = "http://127.0.0.1:9999/geo"
"#,
        )
        .unwrap();
        assert_eq!(cfg.endpoints.geo, "http://127.0.0.1:9999/geo");
        assert_eq!(cfg.endpoints.dns, "https://dns.google/resolve");
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = parse_config("[http\nrequest_timeout_secs = 1").unwrap_err();
        assert!(format!("{err}").contains("overwatch.toml"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load_config(Path::new("/nonexistent/overwatch.toml")).unwrap();
        assert_eq!(cfg.display.quake_cap, 10);
    }
}
