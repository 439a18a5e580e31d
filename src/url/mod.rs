//! URL handling module for Skein
//!
//! This module provides URL canonicalization, host extraction and comparison,
//! and include/exclude pattern matching.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_host};
pub use matcher::{check_patterns, compile_pattern, PatternVerdict};
pub use normalize::{canonicalize, canonicalize_url};
