//! DNS-over-HTTPS resolution via dns.google.
//!
//! Endpoint: `GET {base}?name={domain}&type={A|MX|NS|TXT}`. Answers carry a
//! numeric RR type; responses for a query type can include other types
//! (CNAME chains), so results are filtered by code.

use std::net::Ipv4Addr;

use serde::Deserialize;

use overwatch_types::error::Result;

use crate::client::HttpClient;

/// Record types the pipeline queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Mx,
    Ns,
    Txt,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Txt => "TXT",
        }
    }

    /// Numeric RR type code used in answers.
    pub fn code(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Mx => 15,
            RecordType::Ns => 2,
            RecordType::Txt => 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAnswer {
    #[serde(rename = "type", default)]
    pub rtype: u16,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawResolve {
    #[serde(rename = "Answer", default)]
    answer: Vec<RawAnswer>,
}

/// Resolve `domain`, returning the data of answers matching the queried
/// type. An empty vec means the name exists but has no such records (or
/// does not exist) — callers decide whether that is an error.
pub async fn resolve(
    http: &HttpClient,
    base: &str,
    domain: &str,
    rtype: RecordType,
) -> Result<Vec<String>> {
    let url = format!("{base}?name={domain}&type={}", rtype.as_str());
    let raw: RawResolve = http.get_json(&url).await?;
    Ok(filter_answers(raw.answer, rtype))
}

/// Resolve the full IPv4 set for a domain, dropping malformed answers.
pub async fn resolve_ipv4(http: &HttpClient, base: &str, domain: &str) -> Result<Vec<Ipv4Addr>> {
    let answers = resolve(http, base, domain, RecordType::A).await?;
    Ok(answers
        .iter()
        .filter_map(|data| data.parse().ok())
        .collect())
}

fn filter_answers(answers: Vec<RawAnswer>, rtype: RecordType) -> Vec<String> {
    answers
        .into_iter()
        .filter(|a| a.rtype == rtype.code())
        .map(|a| a.data)
        .collect()
}

/// MX answer data is `"<priority> <host>"`; return just the host.
pub fn mx_host(data: &str) -> &str {
    data.split_whitespace().nth(1).unwrap_or(data)
}

/// Reduce user input to a bare domain: strip scheme, `www.`, and any path.
pub fn clean_domain(raw: &str) -> String {
    let stripped = raw
        .trim()
        .strip_prefix("https://")
        .or_else(|| raw.trim().strip_prefix("http://"))
        .unwrap_or(raw.trim());
    let stripped = stripped.strip_prefix("www.").unwrap_or(stripped);
    stripped
        .split('/')
        .next()
        .unwrap_or(stripped)
        .to_string()
}
