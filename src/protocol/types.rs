use serde::{Deserialize, Serialize};

/// Result record for one fetched page
///
/// Exactly one `Article` is produced for every page the session fetched,
/// whether the fetch succeeded or not. A failed page carries `error` and has
/// empty `content` and `links`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub content: String,

    /// Outbound links in document order
    #[serde(default)]
    pub links: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Article {
    /// Builds the record for a page that could not be fetched or parsed
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            content: String::new(),
            links: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Server to client event
///
/// Serialized as a JSON object tagged by `type`. Exactly one `Complete` or
/// fatal `Error` ends a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    Status {
        message: String,
    },

    Found {
        message: String,
        count: usize,
    },

    Progress {
        current: usize,
        total: usize,
        last_scraped: String,
    },

    Error {
        message: String,
        /// A missing flag is read as fatal
        #[serde(default = "fatal_by_default")]
        fatal: bool,
    },

    Complete {
        data: Vec<Article>,
    },
}

fn fatal_by_default() -> bool {
    true
}

impl ProtocolEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn found(count: usize) -> Self {
        Self::Found {
            message: format!("Found {} links to crawl", count),
            count,
        }
    }

    /// A per-page failure; the session continues
    pub fn page_error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            fatal: false,
        }
    }

    /// A session failure; nothing follows it
    pub fn fatal_error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            fatal: true,
        }
    }

    /// Returns true for the events that end a session
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Complete { .. } => true,
            Self::Error { fatal, .. } => *fatal,
            _ => false,
        }
    }

    /// Wire name of this event
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Found { .. } => "found",
            Self::Progress { .. } => "progress",
            Self::Error { .. } => "error",
            Self::Complete { .. } => "complete",
        }
    }
}

/// Client to server control message sent after the crawl request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_article_shape() {
        let article = Article::failed("https://example.com/x", "HTTP 500");
        assert!(article.is_error());
        assert!(article.content.is_empty());
        assert!(article.links.is_empty());
        assert!(article.title.is_none());
    }

    #[test]
    fn test_terminal_events() {
        assert!(ProtocolEvent::Complete { data: vec![] }.is_terminal());
        assert!(ProtocolEvent::fatal_error("boom").is_terminal());
        assert!(!ProtocolEvent::page_error("one page").is_terminal());
        assert!(!ProtocolEvent::status("Connecting...").is_terminal());
        assert!(!ProtocolEvent::found(3).is_terminal());
    }

    #[test]
    fn test_found_message() {
        match ProtocolEvent::found(4) {
            ProtocolEvent::Found { message, count } => {
                assert_eq!(count, 4);
                assert_eq!(message, "Found 4 links to crawl");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
