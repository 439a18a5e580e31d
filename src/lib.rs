//! Skein: a live, depth-bounded website crawler
//!
//! This crate implements a crawl session engine that walks a website breadth-first
//! under depth, page, domain and pattern bounds, and streams its progress and
//! results to a single observer over a typed event protocol.

pub mod client;
pub mod config;
pub mod crawler;
pub mod output;
pub mod protocol;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Skein operations
#[derive(Debug, Error)]
pub enum SkeinError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SessionState,
        to: state::SessionState,
    },

    #[error("Session failed: {0}")]
    SessionFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// The first three variants are the `InvalidConfig` family reported to a
/// client before a session starts; the rest come from the server TOML file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bad url: {0}")]
    InvalidUrl(String),

    #[error("bad pattern: {0}")]
    InvalidPattern(String),

    #[error("bad selector: {0}")]
    InvalidSelector(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Wire codec errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unexpected binary frame")]
    UnexpectedBinary,
}

/// Result type alias for Skein operations
pub type Result<T> = std::result::Result<T, SkeinError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{normalize_request, CrawlConfig, CrawlRequest};
pub use protocol::{Article, ProtocolEvent};
pub use state::SessionState;
pub use url::{canonicalize_url, extract_domain};
