//! Plain-text export of a finished crawl
//!
//! One header block describing the crawl, then one block per article in the
//! order the articles completed.

use crate::config::CrawlConfig;
use crate::protocol::Article;
use chrono::{DateTime, NaiveDate, Utc};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const TITLE_RULE: &str = "------------------------";
const ARTICLE_RULE: &str = "========================";

/// Writes the text report for `articles` to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(io::Error)` - Failed to create or write the file
pub fn write_text_report(
    articles: &[Article],
    config: &CrawlConfig,
    date: NaiveDate,
    output_path: &Path,
) -> std::io::Result<()> {
    let report = format_text_report(articles, config, date);

    let mut file = File::create(output_path)?;
    file.write_all(report.as_bytes())?;

    Ok(())
}

/// Formats the text report
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use skein::config::{normalize_request, CrawlRequest};
/// use skein::output::format_text_report;
/// use skein::protocol::Article;
///
/// let config = normalize_request(&CrawlRequest::simple("https://example.com")).unwrap();
/// let articles = vec![Article {
///     url: "https://example.com/".to_string(),
///     title: Some("Home".to_string()),
///     content: "Hello".to_string(),
///     ..Article::default()
/// }];
/// let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// let report = format_text_report(&articles, &config, date);
/// assert!(report.starts_with("version: 1\ntitle: Crawl Export - 2024-05-01\n"));
/// ```
pub fn format_text_report(articles: &[Article], config: &CrawlConfig, date: NaiveDate) -> String {
    let mut out = String::new();

    out.push_str("version: 1\n");
    out.push_str(&format!("title: Crawl Export - {}\n", date.format("%Y-%m-%d")));
    out.push_str(&format!("url: {}\n", config.start_url));
    out.push_str(&format!(
        "config: Depth={}, Pages={}, Timeout={}\n\n",
        config.max_depth,
        config.max_pages,
        config.per_request_timeout.as_millis()
    ));

    for article in articles {
        out.push_str(&format!(
            "Title: {}\n",
            article.title.as_deref().unwrap_or("No Title")
        ));
        out.push_str(&format!("URL: {}\n", article.url));
        out.push_str(TITLE_RULE);
        out.push('\n');
        out.push_str(&article.content);
        out.push('\n');
        out.push_str(ARTICLE_RULE);
        out.push_str("\n\n");
    }

    out
}

/// `crawl_export_<unix millis>.txt` in `dir`
pub fn default_export_path(dir: &Path, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!("crawl_export_{}.txt", now.timestamp_millis()))
}
