//! Configuration module for Skein
//!
//! Two kinds of configuration live here:
//!
//! - Per-crawl configuration, sent by a client as a [`CrawlRequest`] and
//!   normalized into a canonical [`CrawlConfig`] by [`normalize_request`].
//! - Process-level configuration, loaded from an optional TOML file into a
//!   [`ServerConfig`].
//!
//! # Example
//!
//! ```no_run
//! use skein::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("skein.toml")).unwrap();
//! println!("Max concurrent fetches: {}", config.crawler.max_concurrent_fetches);
//! ```

mod normalize;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlRequest, CrawlerConfig, ListenConfig, ServerConfig, UserAgentConfig,
};

pub use normalize::{
    normalize_request, DEFAULT_CONTENT_SELECTOR, DEFAULT_LINK_SELECTOR, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_PAGES, DEFAULT_SAME_DOMAIN, DEFAULT_TIMEOUT_MS, DEPTH_RANGE, PAGES_RANGE,
    TIMEOUT_RANGE_MS,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
