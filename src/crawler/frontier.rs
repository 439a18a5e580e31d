//! Frontier: the breadth-first work queue of one crawl session
//!
//! This module handles:
//! - FIFO queueing of URLs with their link depth
//! - The visited set (every URL ever enqueued, never shrinks)
//! - Depth, domain, pattern and page-budget filtering at enqueue time
//!
//! The frontier is owned by exactly one session task. Workers never touch it;
//! they hand discovered links back to the session, which offers them here.
//! Filter, visited check-and-insert, budget check and push therefore happen as
//! one uninterrupted step.

use crate::config::CrawlConfig;
use crate::url::{canonicalize_url, check_patterns, is_same_host, PatternVerdict};
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use tracing::trace;
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical URL (fragment stripped)
    pub url: Url,

    /// Link distance from the start URL (start = 0)
    pub depth: u32,
}

/// Why an offered URL was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Unparseable,
    TooDeep,
    OffDomain,
    Excluded,
    NotIncluded,
    Visited,
    BudgetExhausted,
}

/// Frontier manages the queue, the visited set and the enqueue filters
#[derive(Debug)]
pub struct Frontier {
    /// FIFO queue; entries are always pushed in non-decreasing depth order
    queue: VecDeque<FrontierEntry>,

    /// Canonical URLs already enqueued or fetched
    visited: HashSet<String>,

    /// Number of URLs ever enqueued, including the start URL
    enqueued: usize,

    max_depth: u32,
    max_pages: usize,
    allowed_host: Option<String>,
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl Frontier {
    /// Creates an empty frontier bound by the session config
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            enqueued: 0,
            max_depth: config.max_depth,
            max_pages: config.max_pages,
            allowed_host: config.allowed_host().map(str::to_string),
            include: config.include_pattern.clone(),
            exclude: config.exclude_pattern.clone(),
        }
    }

    /// Enqueues the start URL at depth 0
    ///
    /// The start URL defines the allowed domain, so domain and pattern filters
    /// do not apply to it. It still counts against the budget and is marked
    /// visited.
    pub fn seed(&mut self, start_url: &Url) -> bool {
        if self.enqueued >= self.max_pages || !self.visited.insert(start_url.to_string()) {
            return false;
        }
        self.push(start_url.clone(), 0);
        true
    }

    /// Offers a discovered URL at the given depth
    ///
    /// Returns false and changes nothing if the URL is rejected. Filters run in
    /// this order: depth, domain (when same-domain only), exclude pattern,
    /// include pattern, visited set, page budget.
    pub fn enqueue(&mut self, url: &str, depth: u32) -> bool {
        match self.try_enqueue(url, depth) {
            Ok(()) => true,
            Err(reason) => {
                trace!("Frontier dropped {} at depth {}: {:?}", url, depth, reason);
                false
            }
        }
    }

    fn try_enqueue(&mut self, url: &str, depth: u32) -> Result<(), Rejection> {
        if depth > self.max_depth {
            return Err(Rejection::TooDeep);
        }

        let url = canonicalize_url(url).map_err(|_| Rejection::Unparseable)?;

        if let Some(host) = &self.allowed_host {
            if !is_same_host(&url, host) {
                return Err(Rejection::OffDomain);
            }
        }

        match check_patterns(url.as_str(), self.include.as_ref(), self.exclude.as_ref()) {
            PatternVerdict::Allowed => {}
            PatternVerdict::Excluded => return Err(Rejection::Excluded),
            PatternVerdict::NotIncluded => return Err(Rejection::NotIncluded),
        }

        if self.visited.contains(url.as_str()) {
            return Err(Rejection::Visited);
        }

        if self.enqueued >= self.max_pages {
            return Err(Rejection::BudgetExhausted);
        }

        self.visited.insert(url.to_string());
        self.push(url, depth);
        Ok(())
    }

    fn push(&mut self, url: Url, depth: u32) {
        self.enqueued += 1;
        self.queue.push_back(FrontierEntry { url, depth });
    }

    /// Removes the oldest entry
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Number of queued entries
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs ever enqueued in this session
    pub fn enqueued_count(&self) -> usize {
        self.enqueued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{normalize_request, CrawlRequest};

    fn config(request: CrawlRequest) -> CrawlConfig {
        normalize_request(&request).unwrap()
    }

    fn request(max_depth: i64, max_pages: i64) -> CrawlRequest {
        CrawlRequest {
            url: "https://example.com/".to_string(),
            max_depth: Some(max_depth),
            max_pages: Some(max_pages),
            ..CrawlRequest::default()
        }
    }

    fn seeded(request: CrawlRequest) -> Frontier {
        let config = config(request);
        let mut frontier = Frontier::new(&config);
        assert!(frontier.seed(&config.start_url));
        frontier
    }

    #[test]
    fn test_seed_and_dequeue() {
        let mut frontier = seeded(request(2, 10));
        assert_eq!(frontier.size(), 1);
        assert_eq!(frontier.enqueued_count(), 1);

        let entry = frontier.dequeue().unwrap();
        assert_eq!(entry.url.as_str(), "https://example.com/");
        assert_eq!(entry.depth, 0);
        assert!(frontier.dequeue().is_none());
        assert!(!frontier.enqueue("https://example.com/", 1));
    }

    #[test]
    fn test_fifo_order_is_breadth_first() {
        let mut frontier = seeded(request(3, 20));
        frontier.dequeue();

        assert!(frontier.enqueue("https://example.com/a", 1));
        assert!(frontier.enqueue("https://example.com/b", 1));
        frontier.dequeue();
        assert!(frontier.enqueue("https://example.com/a/deep", 2));

        let order: Vec<(String, u32)> = std::iter::from_fn(|| frontier.dequeue())
            .map(|e| (e.url.path().to_string(), e.depth))
            .collect();
        assert_eq!(
            order,
            vec![("/b".to_string(), 1), ("/a/deep".to_string(), 2)]
        );
    }

    #[test]
    fn test_rejects_too_deep() {
        let mut frontier = seeded(request(1, 10));
        assert!(frontier.enqueue("https://example.com/a", 1));
        assert!(!frontier.enqueue("https://example.com/b", 2));
        assert_eq!(frontier.size(), 2);
    }

    #[test]
    fn test_rejects_duplicates_and_fragments() {
        let mut frontier = seeded(request(2, 10));
        assert!(frontier.enqueue("https://example.com/a", 1));
        assert!(!frontier.enqueue("https://example.com/a", 1));
        assert!(!frontier.enqueue("https://example.com/a#section", 2));
        assert!(!frontier.enqueue("https://EXAMPLE.com/a", 1));
        assert!(!frontier.enqueue("https://example.com/", 1));
        assert_eq!(frontier.enqueued_count(), 2);
    }

    #[test]
    fn test_rejects_off_domain_when_same_domain() {
        let mut frontier = seeded(request(2, 10));
        assert!(!frontier.enqueue("https://other.org/a", 1));
        assert!(!frontier.enqueue("https://sub.example.com/a", 1));
        assert!(frontier.enqueue("http://example.com/plain", 1));
    }

    #[test]
    fn test_allows_any_domain_when_disabled() {
        let mut frontier = seeded(CrawlRequest {
            same_domain: Some(false),
            ..request(2, 10)
        });
        assert!(frontier.enqueue("https://other.org/a", 1));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let mut frontier = seeded(CrawlRequest {
            url_regex: Some("/docs/".to_string()),
            exclude_regex: Some(r"\.pdf$".to_string()),
            ..request(2, 10)
        });
        assert!(frontier.enqueue("https://example.com/docs/intro", 1));
        assert!(!frontier.enqueue("https://example.com/docs/manual.pdf", 1));
        assert!(!frontier.enqueue("https://example.com/blog/post", 1));
    }

    #[test]
    fn test_rejected_url_is_not_marked_visited() {
        let mut frontier = seeded(CrawlRequest {
            max_depth: Some(1),
            ..request(1, 10)
        });
        assert!(!frontier.enqueue("https://example.com/late", 2));
        assert!(frontier.enqueue("https://example.com/late", 1));
    }

    #[test]
    fn test_page_budget() {
        let mut frontier = seeded(request(2, 3));
        assert!(frontier.enqueue("https://example.com/a", 1));
        assert!(frontier.enqueue("https://example.com/b", 1));
        assert!(!frontier.enqueue("https://example.com/c", 1));
        assert_eq!(frontier.enqueued_count(), 3);

        // Dequeuing does not give budget back
        frontier.dequeue();
        assert!(!frontier.enqueue("https://example.com/d", 1));
    }

    #[test]
    fn test_rejects_unparseable_and_non_http() {
        let mut frontier = seeded(CrawlRequest {
            same_domain: Some(false),
            ..request(2, 10)
        });
        assert!(!frontier.enqueue("not a url", 1));
        assert!(!frontier.enqueue("ftp://example.com/file", 1));
    }

    #[test]
    fn test_seed_ignores_patterns() {
        let config = config(CrawlRequest {
            url_regex: Some("/docs/".to_string()),
            ..request(2, 10)
        });
        let mut frontier = Frontier::new(&config);
        assert!(frontier.seed(&config.start_url));
        assert!(!frontier.seed(&config.start_url));
        assert_eq!(frontier.dequeue().map(|entry| entry.depth), Some(0));
    }
}
