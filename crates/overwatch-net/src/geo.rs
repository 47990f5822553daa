//! IP geolocation via geojs.
//!
//! Endpoint: `GET {base}/{ip}.json`. The upstream sometimes reports the
//! operator under `organization_name` and sometimes `organization`, and
//! serializes coordinates as strings; normalization flattens all of that.

use serde::Deserialize;
use serde_json::Value;

use overwatch_types::error::Result;

use crate::UNKNOWN;
use crate::client::HttpClient;

/// Raw geojs response. Every field is optional by design.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGeo {
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
}

/// Normalized geolocation record.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoProfile {
    pub ip: String,
    pub isp: String,
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeoProfile {
    /// `"lat, lon"` with five decimals, or placeholders.
    pub fn coordinates(&self) -> String {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => format!("{lat:.5}, {lon:.5}"),
            _ => format!("{UNKNOWN}, {UNKNOWN}"),
        }
    }
}

/// Apply the defaulting rules in one place.
pub fn normalize(ip: &str, raw: RawGeo) -> GeoProfile {
    GeoProfile {
        ip: ip.to_string(),
        isp: first_present(&[raw.organization_name, raw.organization]),
        city: first_present(&[raw.city]),
        country: first_present(&[raw.country_code]),
        latitude: raw.latitude.as_ref().and_then(coordinate),
        longitude: raw.longitude.as_ref().and_then(coordinate),
    }
}

fn first_present(candidates: &[Option<String>]) -> String {
    candidates
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// geojs serializes coordinates as strings; tolerate numbers too.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Geolocate one address.
pub async fn lookup(http: &HttpClient, base: &str, target: &str) -> Result<GeoProfile> {
    let url = format!("{base}/{target}.json");
    let raw: RawGeo = http.get_json(&url).await?;
    Ok(normalize(target, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawGeo {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn full_payload_normalizes() {
        let profile = normalize(
            "8.8.8.8",
            raw(r#"{
                "organization_name": "GOOGLE LLC",
                "city": "Mountain View",
                "country_code": "US",
                "latitude": "37.40599",
                "longitude": "-122.07851"
            }"#),
        );
        assert_eq!(profile.isp, "GOOGLE LLC");
        assert_eq!(profile.city, "Mountain View");
        assert_eq!(profile.country, "US");
        assert_eq!(profile.coordinates(), "37.40599, -122.07851");
    }

    #[test]
    fn missing_city_becomes_unknown() {
        let profile = normalize("1.2.3.4", raw(r#"{"country_code": "AU"}"#));
        assert_eq!(profile.city, "UNKNOWN");
        assert_eq!(profile.isp, "UNKNOWN");
        assert_eq!(profile.country, "AU");
    }

    #[test]
    fn organization_fallback_applies() {
        let profile = normalize("1.2.3.4", raw(r#"{"organization": "AS13335 Cloudflare"}"#));
        assert_eq!(profile.isp, "AS13335 Cloudflare");
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let profile = normalize(
            "1.2.3.4",
            raw(r#"{"organization_name": "", "organization": "ACME NET"}"#),
        );
        assert_eq!(profile.isp, "ACME NET");
    }

    #[test]
    fn numeric_coordinates_are_accepted() {
        let profile = normalize("1.2.3.4", raw(r#"{"latitude": 51.5, "longitude": -0.1}"#));
        assert_eq!(profile.latitude, Some(51.5));
        assert_eq!(profile.longitude, Some(-0.1));
    }

    #[test]
    fn garbage_coordinates_degrade_to_placeholders() {
        let profile = normalize(
            "1.2.3.4",
            raw(r#"{"latitude": "not-a-number", "longitude": [1]}"#),
        );
        assert_eq!(profile.latitude, None);
        assert_eq!(profile.coordinates(), "UNKNOWN, UNKNOWN");
    }
}
