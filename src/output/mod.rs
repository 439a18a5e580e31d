//! Output module for presenting crawl results
//!
//! This module handles:
//! - Exporting a finished crawl as a plain-text report
//! - Summarizing the result set as statistics

mod report;
pub mod stats;

pub use report::{default_export_path, format_text_report, write_text_report};
pub use stats::{print_statistics, CrawlStatistics};
