//! Shared outbound HTTP client.
//!
//! Thin wrapper over `reqwest` that applies the configured User-Agent and
//! default deadline, and maps transport failures into [`OverwatchError`].
//! All upstream calls are unauthenticated GETs.

use std::time::Duration;

use serde::de::DeserializeOwned;

use overwatch_types::config::HttpConfig;
use overwatch_types::error::{OverwatchError, Result};

/// Cheap-to-clone HTTP client handle shared by every feed module.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    default_timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let default_timeout = Duration::from_secs(config.request_timeout_secs);
        let inner = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(default_timeout)
            .build()
            .map_err(|e| OverwatchError::Transport(format!("client init: {e}")))?;
        Ok(Self {
            inner,
            default_timeout,
        })
    }

    /// GET `url` and parse the JSON body. Non-success statuses are
    /// transport errors.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        match self.try_get_json(url, None).await? {
            Ok(body) => Ok(body),
            Err(status) => Err(OverwatchError::Transport(format!("HTTP {status}"))),
        }
    }

    /// GET with a per-request deadline overriding the default.
    pub async fn get_json_bounded<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T> {
        match self.try_get_json(url, Some(timeout)).await? {
            Ok(body) => Ok(body),
            Err(status) => Err(OverwatchError::Transport(format!("HTTP {status}"))),
        }
    }

    /// GET returning `Ok(Ok(body))` on success, `Ok(Err(status))` on a
    /// non-success HTTP status (so callers can give statuses like 404 a
    /// protocol-specific meaning), and `Err(_)` on transport failure or
    /// deadline expiry.
    pub async fn try_get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<std::result::Result<T, u16>> {
        let deadline = timeout.unwrap_or(self.default_timeout);
        let mut request = self.inner.get(url);
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        log::debug!("GET {url}");
        let response = request.send().await.map_err(|e| map_error(e, deadline))?;
        let status = response.status();
        if !status.is_success() {
            return Ok(Err(status.as_u16()));
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| map_error(e, deadline))?;
        Ok(Ok(body))
    }

    /// GET `url` and return the plain-text body (CSV feeds).
    pub async fn get_text(&self, url: &str) -> Result<String> {
        log::debug!("GET {url}");
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| map_error(e, self.default_timeout))?;
        let status = response.status();
        if !status.is_success() {
            return Err(OverwatchError::Transport(format!("HTTP {status}")));
        }
        response
            .text()
            .await
            .map_err(|e| map_error(e, self.default_timeout))
    }
}

fn map_error(e: reqwest::Error, deadline: Duration) -> OverwatchError {
    if e.is_timeout() {
        OverwatchError::Timeout(deadline.as_secs())
    } else if e.is_decode() {
        OverwatchError::Upstream(format!("MALFORMED UPSTREAM PAYLOAD: {e}"))
    } else {
        OverwatchError::Transport(e.to_string())
    }
}
