//! CVE repository intercepts via the GitHub search API.
//!
//! Endpoint: `GET {base}?q=CVE-2025+OR+CVE-2026&sort=updated&order=desc`.
//! GitHub rejects requests without a User-Agent; the shared client sets
//! one.

use serde::Deserialize;

use overwatch_types::error::Result;

use crate::UNKNOWN;
use crate::client::HttpClient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearch {
    #[serde(default)]
    pub items: Vec<RawRepo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRepo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Normalized repository intercept, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIntercept {
    /// Repository name, uppercased the way the intercept panel shows it.
    pub name: String,
    /// Description clipped to 80 characters.
    pub description: String,
    pub url: String,
}

const DESCRIPTION_CLIP: usize = 80;

pub fn normalize(raw: RawSearch) -> Vec<RepoIntercept> {
    raw.items
        .into_iter()
        .map(|item| RepoIntercept {
            name: item
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
                .to_uppercase(),
            description: clip_description(item.description.as_deref()),
            url: item.html_url.unwrap_or_else(|| UNKNOWN.to_string()),
        })
        .collect()
}

fn clip_description(description: Option<&str>) -> String {
    match description {
        Some(text) if !text.trim().is_empty() => {
            if text.chars().count() > DESCRIPTION_CLIP {
                let clipped: String = text.chars().take(DESCRIPTION_CLIP).collect();
                format!("{clipped}...")
            } else {
                text.to_string()
            }
        }
        _ => "NO_PAYLOAD_DESCRIPTION_PROVIDED".to_string(),
    }
}

/// Search for recently-updated CVE proof-of-concept repositories.
pub async fn cve_intercepts(
    http: &HttpClient,
    base: &str,
    per_page: usize,
) -> Result<Vec<RepoIntercept>> {
    let url = format!("{base}?q=CVE-2025+OR+CVE-2026&sort=updated&order=desc&per_page={per_page}");
    let raw: RawSearch = http.get_json(&url).await?;
    Ok(normalize(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_name_is_uppercased() {
        let raw: RawSearch = serde_json::from_str(
            r#"{"items": [{"name": "cve-2025-poc", "description": "exploit demo", "html_url": "https://github.com/x/cve-2025-poc"}]}"#,
        )
        .unwrap();
        let intercepts = normalize(raw);
        assert_eq!(intercepts[0].name, "CVE-2025-POC");
        assert_eq!(intercepts[0].description, "exploit demo");
    }

    #[test]
    fn missing_description_gets_placeholder() {
        let raw: RawSearch = serde_json::from_str(r#"{"items": [{"name": "x"}]}"#).unwrap();
        let intercepts = normalize(raw);
        assert_eq!(intercepts[0].description, "NO_PAYLOAD_DESCRIPTION_PROVIDED");
    }

    #[test]
    fn long_description_is_clipped() {
        let long = "a".repeat(200);
        let raw = RawSearch {
            items: vec![RawRepo {
                name: Some("x".into()),
                description: Some(long),
                html_url: None,
            }],
        };
        let intercepts = normalize(raw);
        assert_eq!(intercepts[0].description.chars().count(), 83);
        assert!(intercepts[0].description.ends_with("..."));
    }

    #[test]
    fn missing_items_is_empty() {
        let raw: RawSearch = serde_json::from_str(r#"{"total_count": 0}"#).unwrap();
        assert!(normalize(raw).is_empty());
    }
}
