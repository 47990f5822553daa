//! Error types for OVERWATCH.

use std::io;

/// Errors produced by the OVERWATCH pipeline.
///
/// The `Command`, `Validation`, and `Upstream` variants carry text that is
/// surfaced verbatim as a terminal error line, so they display without a
/// prefix. Infrastructure variants keep a labelled prefix.
#[derive(Debug, thiserror::Error)]
pub enum OverwatchError {
    /// Unknown verb or a problem in command dispatch itself.
    #[error("{0}")]
    Command(String),

    /// Target failed verb-specific validation before any network call.
    #[error("{0}")]
    Validation(String),

    /// Upstream answered, but the payload is unusable for this protocol.
    #[error("{0}")]
    Upstream(String),

    /// Network-level failure or non-success HTTP status.
    #[error("TRANSPORT FAILURE: {0}")]
    Transport(String),

    /// A bounded call exceeded its client-side deadline.
    #[error("CONNECTION TIMED OUT AFTER {0}S")]
    Timeout(u64),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, OverwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_displays_bare_message() {
        let e = OverwatchError::Command("COMMAND NOT RECOGNIZED: foo".into());
        assert_eq!(format!("{e}"), "COMMAND NOT RECOGNIZED: foo");
    }

    #[test]
    fn validation_error_displays_bare_message() {
        let e = OverwatchError::Validation("INVALID IPV4 TARGET: 300.1.1.1".into());
        assert_eq!(format!("{e}"), "INVALID IPV4 TARGET: 300.1.1.1");
    }

    #[test]
    fn upstream_error_displays_bare_message() {
        let e = OverwatchError::Upstream("NO IPv4 RECORD FOUND.".into());
        assert_eq!(format!("{e}"), "NO IPv4 RECORD FOUND.");
    }

    #[test]
    fn transport_error_is_prefixed() {
        let e = OverwatchError::Transport("HTTP 503".into());
        assert_eq!(format!("{e}"), "TRANSPORT FAILURE: HTTP 503");
    }

    #[test]
    fn timeout_error_names_the_deadline() {
        let e = OverwatchError::Timeout(8);
        assert_eq!(format!("{e}"), "CONNECTION TIMED OUT AFTER 8S");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: OverwatchError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: OverwatchError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid").unwrap_err();
        let e: OverwatchError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn result_alias_roundtrip() {
        let ok: Result<i32> = Ok(7);
        assert_eq!(ok.unwrap(), 7);
        let err: Result<i32> = Err(OverwatchError::Timeout(8));
        assert!(err.is_err());
    }
}
