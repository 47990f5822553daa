//! Seismic feed via the USGS GeoJSON summary endpoint.
//!
//! The configured URL is the complete feed address (e.g. the 2.5+/day
//! summary). Feature coordinates are `[lon, lat, depth_km]`.

use serde::Deserialize;

use overwatch_types::error::Result;

use crate::UNKNOWN;
use crate::client::HttpClient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFeed {
    #[serde(default)]
    pub features: Vec<RawFeature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub properties: RawProperties,
    #[serde(default)]
    pub geometry: RawGeometry,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// Normalized seismic event.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeEvent {
    pub magnitude: f64,
    pub place: String,
    pub time_ms: Option<i64>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub depth_km: Option<f64>,
}

pub fn normalize(raw: RawFeed) -> Vec<QuakeEvent> {
    raw.features
        .into_iter()
        .map(|f| QuakeEvent {
            magnitude: f.properties.mag.unwrap_or(0.0),
            place: f
                .properties
                .place
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            time_ms: f.properties.time,
            longitude: f.geometry.coordinates.first().copied(),
            latitude: f.geometry.coordinates.get(1).copied(),
            depth_km: f.geometry.coordinates.get(2).copied(),
        })
        .collect()
}

/// Fetch the current feed.
pub async fn feed(http: &HttpClient, url: &str) -> Result<Vec<QuakeEvent>> {
    let raw: RawFeed = http.get_json(url).await?;
    Ok(normalize(raw))
}
