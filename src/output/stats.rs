//! Statistics over the articles of a finished crawl
//!
//! This module provides functionality for summarizing and displaying the
//! result set of one session.

use crate::protocol::Article;
use crate::url::extract_domain;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Total number of pages fetched
    pub total_pages: usize,

    /// Pages that carry an error
    pub failed_pages: usize,

    /// Pages whose extracted content is empty although the fetch succeeded
    pub empty_pages: usize,

    /// Number of unique hosts among fetched pages
    pub unique_domains: usize,

    /// Total number of links discovered, duplicates included
    pub total_links: usize,

    /// Distinct links discovered
    pub unique_links: usize,

    /// Error message and how many pages reported it
    pub error_summary: BTreeMap<String, usize>,
}

impl CrawlStatistics {
    /// Computes statistics from a result set
    pub fn from_articles(articles: &[Article]) -> Self {
        let mut stats = CrawlStatistics {
            total_pages: articles.len(),
            ..Self::default()
        };

        let mut domains = HashSet::new();
        let mut links = HashSet::new();

        for article in articles {
            if let Some(domain) = Url::parse(&article.url).ok().as_ref().and_then(extract_domain) {
                domains.insert(domain);
            }

            match &article.error {
                Some(error) => {
                    stats.failed_pages += 1;
                    *stats.error_summary.entry(error.clone()).or_insert(0) += 1;
                }
                None if article.content.trim().is_empty() => stats.empty_pages += 1,
                None => {}
            }

            stats.total_links += article.links.len();
            links.extend(article.links.iter().map(String::as_str));
        }

        stats.unique_domains = domains.len();
        stats.unique_links = links.len();
        stats
    }

    /// Percentage of pages fetched without error
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        let succeeded = self.total_pages - self.failed_pages;
        (succeeded as f64 / self.total_pages as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages fetched: {}", stats.total_pages);
    println!("  Unique domains: {}", stats.unique_domains);
    println!(
        "  Links found: {} ({} unique)",
        stats.total_links, stats.unique_links
    );
    if stats.empty_pages > 0 {
        println!("  Pages without content: {}", stats.empty_pages);
    }
    println!();

    if !stats.error_summary.is_empty() {
        println!("Error Summary:");
        let mut error_counts: Vec<_> = stats.error_summary.iter().collect();
        error_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (error, count) in error_counts {
            println!("  {}: {}", error, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched without error)",
        stats.success_rate(),
        stats.total_pages - stats.failed_pages,
        stats.total_pages
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, links: &[&str]) -> Article {
        Article {
            url: url.to_string(),
            title: None,
            content: "text".to_string(),
            links: links.iter().map(|l| l.to_string()).collect(),
            error: None,
        }
    }

    #[test]
    fn test_statistics_from_articles() {
        let articles = vec![
            page("https://example.com/", &["https://example.com/a", "https://other.org/"]),
            page("https://example.com/a", &["https://example.com/"]),
            Article::failed("https://example.com/b", "HTTP 500"),
            Article::failed("https://example.com/c", "HTTP 500"),
            Article {
                content: "   ".to_string(),
                ..page("https://mirror.example.net/", &["https://example.com/a"])
            },
        ];

        let stats = CrawlStatistics::from_articles(&articles);
        assert_eq!(stats.total_pages, 5);
        assert_eq!(stats.failed_pages, 2);
        assert_eq!(stats.empty_pages, 1);
        assert_eq!(stats.unique_domains, 2);
        assert_eq!(stats.total_links, 4);
        assert_eq!(stats.unique_links, 3);
        assert_eq!(stats.error_summary.get("HTTP 500"), Some(&2));
        assert!((stats.success_rate() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = CrawlStatistics::from_articles(&[]);
        assert_eq!(stats, CrawlStatistics::default());
        assert_eq!(stats.success_rate(), 0.0);
    }
}
