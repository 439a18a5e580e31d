use crate::ConfigError;
use regex::Regex;

/// Outcome of checking a URL against the include/exclude patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternVerdict {
    /// The URL may be crawled
    Allowed,
    /// The exclude pattern matched
    Excluded,
    /// An include pattern is set and did not match
    NotIncluded,
}

/// Compiles a user supplied URL pattern
///
/// Patterns are unanchored: a pattern matches when it is found anywhere
/// in the URL.
pub fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}

/// Checks a URL against optional include and exclude patterns
///
/// Exclusion wins over inclusion: a URL matched by both is excluded.
///
/// # Examples
///
/// ```
/// use skein::url::{check_patterns, compile_pattern, PatternVerdict};
///
/// let include = compile_pattern("/blog/").unwrap();
/// let exclude = compile_pattern("draft").unwrap();
///
/// assert_eq!(
///     check_patterns("https://a.com/blog/post", Some(&include), Some(&exclude)),
///     PatternVerdict::Allowed
/// );
/// assert_eq!(
///     check_patterns("https://a.com/blog/draft", Some(&include), Some(&exclude)),
///     PatternVerdict::Excluded
/// );
/// assert_eq!(
///     check_patterns("https://a.com/about", Some(&include), None),
///     PatternVerdict::NotIncluded
/// );
/// ```
pub fn check_patterns(url: &str, include: Option<&Regex>, exclude: Option<&Regex>) -> PatternVerdict {
    if let Some(exclude) = exclude {
        if exclude.is_match(url) {
            return PatternVerdict::Excluded;
        }
    }

    if let Some(include) = include {
        if !include.is_match(url) {
            return PatternVerdict::NotIncluded;
        }
    }

    PatternVerdict::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_patterns_allows_everything() {
        assert_eq!(
            check_patterns("https://example.com/", None, None),
            PatternVerdict::Allowed
        );
    }

    #[test]
    fn test_include_is_unanchored() {
        let include = compile_pattern("docs").unwrap();
        assert_eq!(
            check_patterns("https://example.com/en/docs/intro", Some(&include), None),
            PatternVerdict::Allowed
        );
    }

    #[test]
    fn test_include_rejects_non_matching() {
        let include = compile_pattern(r"/docs/").unwrap();
        assert_eq!(
            check_patterns("https://example.com/blog", Some(&include), None),
            PatternVerdict::NotIncluded
        );
    }

    #[test]
    fn test_exclude_rejects_matching() {
        let exclude = compile_pattern(r"\.pdf$").unwrap();
        assert_eq!(
            check_patterns("https://example.com/file.pdf", None, Some(&exclude)),
            PatternVerdict::Excluded
        );
    }

    #[test]
    fn test_exclude_beats_include() {
        let include = compile_pattern("example").unwrap();
        let exclude = compile_pattern("private").unwrap();
        assert_eq!(
            check_patterns(
                "https://example.com/private",
                Some(&include),
                Some(&exclude)
            ),
            PatternVerdict::Excluded
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let result = compile_pattern("([unclosed");
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidPattern(_)));
    }
}
