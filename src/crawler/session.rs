//! Crawl session - orchestration of one crawl from start URL to terminal event
//!
//! A session owns its frontier, visited set, results and in-flight fetch tasks
//! exclusively. Fetch tasks run in parallel on a `JoinSet`; every outcome comes
//! back to the session loop, which is the only place that records articles,
//! offers links to the frontier and emits events. Events therefore leave the
//! session in one total order.

use crate::config::{CrawlConfig, CrawlerConfig};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::PageExtractor;
use crate::crawler::worker::{PageOutcome, PageWorker};
use crate::protocol::{Article, ProtocolEvent};
use crate::state::SessionState;
use crate::SkeinError;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Default capacity of a session's event channel
const EVENT_BUFFER: usize = 64;

/// Per-session resource limits taken from the process configuration
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Upper bound on in-flight fetches
    pub max_concurrent_fetches: usize,

    /// Capacity of the event channel
    pub event_buffer: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

impl From<&CrawlerConfig> for SessionOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_concurrent_fetches: config.max_concurrent_fetches.max(1) as usize,
            event_buffer: EVENT_BUFFER,
        }
    }
}

/// Final account of a session, returned by its task
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub state: SessionState,
    pub pages_fetched: usize,
    pub articles: Vec<Article>,
}

/// Handle to a spawned session
pub struct SessionHandle {
    /// Ordered event stream; closes after the terminal event
    pub events: mpsc::Receiver<ProtocolEvent>,

    /// Cancels the session; nothing is emitted after cancellation
    pub cancel: CancellationToken,

    /// Resolves to the session report once the session has stopped
    pub task: JoinHandle<SessionReport>,
}

/// Why the session loop stopped before completing
#[derive(Debug)]
enum Halt {
    Cancelled,
    Failed(String),
}

impl From<SkeinError> for Halt {
    fn from(e: SkeinError) -> Self {
        match e {
            SkeinError::SessionFailure(message) => Halt::Failed(message),
            other => Halt::Failed(other.to_string()),
        }
    }
}

/// Runtime state of one crawl session
pub struct CrawlSession {
    config: CrawlConfig,
    worker: PageWorker,
    frontier: Frontier,
    events: mpsc::Sender<ProtocolEvent>,
    cancel: CancellationToken,
    state: SessionState,
    max_concurrency: usize,
    pages_fetched: usize,
    results: Vec<Article>,
    found_reported: bool,
    dispatched_depth: Option<u32>,
}

impl CrawlSession {
    /// Creates a pending session
    ///
    /// # Errors
    ///
    /// Returns `SkeinError::Config` if a selector in `config` does not compile.
    pub fn new(
        config: CrawlConfig,
        client: Client,
        options: SessionOptions,
        events: mpsc::Sender<ProtocolEvent>,
        cancel: CancellationToken,
    ) -> Result<Self, SkeinError> {
        let extractor = PageExtractor::from_config(&config)?;
        let worker = PageWorker::new(client, extractor, config.per_request_timeout);
        let frontier = Frontier::new(&config);

        Ok(Self {
            config,
            worker,
            frontier,
            events,
            cancel,
            state: SessionState::Pending,
            max_concurrency: options.max_concurrent_fetches.max(1),
            pages_fetched: 0,
            results: Vec::new(),
            found_reported: false,
            dispatched_depth: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to a terminal state
    ///
    /// Emits exactly one `complete` or fatal `error` unless cancelled, in which
    /// case nothing further is emitted. Outstanding fetches are aborted when
    /// this returns.
    pub async fn run(mut self) -> SessionReport {
        info!("Starting crawl of {}", self.config.start_url);

        let mut tasks = JoinSet::new();
        let outcome = self.drive(&mut tasks).await;
        tasks.abort_all();

        match outcome {
            Ok(()) => {
                info!(
                    "Crawl of {} completed: {} pages",
                    self.config.start_url, self.pages_fetched
                );
            }
            Err(Halt::Cancelled) => {
                info!(
                    "Crawl of {} cancelled after {} pages",
                    self.config.start_url, self.pages_fetched
                );
                self.force_state(SessionState::Cancelled);
            }
            Err(Halt::Failed(message)) => {
                error!("Crawl of {} failed: {}", self.config.start_url, message);
                self.force_state(SessionState::Failed);
                // Nobody may be listening any more; the state is already final
                if self.emit(ProtocolEvent::fatal_error(message)).await.is_err() {
                    debug!("Fatal error for {} was not delivered", self.config.start_url);
                }
            }
        }

        SessionReport {
            state: self.state,
            pages_fetched: self.pages_fetched,
            articles: self.results,
        }
    }

    async fn drive(&mut self, tasks: &mut JoinSet<PageOutcome>) -> Result<(), Halt> {
        if self.cancel.is_cancelled() {
            return Err(Halt::Cancelled);
        }

        self.transition(SessionState::Running)?;
        self.emit(ProtocolEvent::status("Connecting...")).await?;
        self.frontier.seed(&self.config.start_url);

        loop {
            self.dispatch(tasks).await?;

            if tasks.is_empty() {
                debug!("Frontier drained with nothing in flight");
                break;
            }

            let joined = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(Halt::Cancelled),
                joined = tasks.join_next() => joined,
            };

            let outcome = match joined {
                Some(Ok(outcome)) => outcome,
                Some(Err(e)) => {
                    return Err(SkeinError::SessionFailure(format!("fetch task failed: {}", e)).into())
                }
                None => break,
            };

            self.absorb(outcome).await?;

            if self.pages_fetched >= self.config.max_pages {
                debug!("Page budget of {} reached", self.config.max_pages);
                break;
            }
        }

        let data = self.results.clone();
        self.emit(ProtocolEvent::Complete { data }).await?;
        self.transition(SessionState::Completed)?;
        Ok(())
    }

    /// Starts fetch tasks until the concurrency cap or the frontier runs out
    async fn dispatch(&mut self, tasks: &mut JoinSet<PageOutcome>) -> Result<(), Halt> {
        while tasks.len() < self.concurrency_cap() {
            let Some(entry) = self.frontier.dequeue() else {
                break;
            };

            if self.dispatched_depth.map_or(true, |d| entry.depth > d) {
                self.dispatched_depth = Some(entry.depth);
                self.emit(ProtocolEvent::status(format!(
                    "Crawling depth {}...",
                    entry.depth
                )))
                .await?;
            }

            tasks.spawn(self.worker.clone().process(entry));
        }
        Ok(())
    }

    /// Never more in flight than the remaining page budget
    fn concurrency_cap(&self) -> usize {
        let remaining = self.config.max_pages.saturating_sub(self.pages_fetched);
        self.max_concurrency.min(remaining)
    }

    /// Folds one finished fetch into the session
    async fn absorb(&mut self, outcome: PageOutcome) -> Result<(), Halt> {
        let PageOutcome { entry, article } = outcome;

        if entry.depth == 0 {
            if let Some(reason) = &article.error {
                return Err(Halt::Failed(format!(
                    "Failed to fetch start URL {}: {}",
                    entry.url, reason
                )));
            }
        }

        if let Some(reason) = &article.error {
            self.emit(ProtocolEvent::page_error(format!(
                "Failed to fetch {}: {}",
                entry.url, reason
            )))
            .await?;
        }

        let next_depth = entry.depth + 1;
        if next_depth <= self.config.max_depth {
            let offered = article.links.len();
            let accepted = article
                .links
                .iter()
                .filter(|link| self.frontier.enqueue(link, next_depth))
                .count();
            debug!(
                "{}: {} of {} links queued at depth {}",
                entry.url, accepted, offered, next_depth
            );
        }

        let succeeded = !article.is_error();
        let last_scraped = article.url.clone();
        self.record(article);

        if succeeded && !self.found_reported {
            self.found_reported = true;
            self.emit(ProtocolEvent::found(self.frontier.size())).await?;
        }

        let total = self.config.max_pages.min(self.frontier.enqueued_count());
        self.emit(ProtocolEvent::Progress {
            current: self.pages_fetched,
            total,
            last_scraped,
        })
        .await
    }

    /// Appends the article and counts the page in one step
    fn record(&mut self, article: Article) {
        self.results.push(article);
        self.pages_fetched += 1;
    }

    /// Sends an event, treating a gone receiver as cancellation
    async fn emit(&self, event: ProtocolEvent) -> Result<(), Halt> {
        let kind = event.kind();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Halt::Cancelled),
            sent = self.events.send(event) => match sent {
                Ok(()) => Ok(()),
                Err(_) => {
                    debug!("Event receiver dropped while sending {}", kind);
                    self.cancel.cancel();
                    Err(Halt::Cancelled)
                }
            },
        }
    }

    fn transition(&mut self, next: SessionState) -> Result<(), SkeinError> {
        if !self.state.can_transition_to(next) {
            return Err(SkeinError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!("Session {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Moves to a terminal state unless one was already reached
    fn force_state(&mut self, next: SessionState) {
        if self.transition(next).is_err() {
            debug!("Session already {}, ignoring {}", self.state, next);
        }
    }
}

/// Spawns a session on the current runtime
///
/// # Errors
///
/// Returns `SkeinError::Config` if a selector in `config` does not compile.
///
/// # Example
///
/// ```no_run
/// use skein::config::{normalize_request, CrawlRequest, CrawlerConfig, UserAgentConfig};
/// use skein::crawler::{build_http_client, spawn_session, SessionOptions};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let config = normalize_request(&CrawlRequest::simple("https://example.com"))?;
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default())?;
/// let mut handle = spawn_session(config, client, SessionOptions::default())?;
/// while let Some(event) = handle.events.recv().await {
///     println!("{:?}", event);
/// }
/// let report = handle.task.await?;
/// println!("{} pages", report.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub fn spawn_session(
    config: CrawlConfig,
    client: Client,
    options: SessionOptions,
) -> Result<SessionHandle, SkeinError> {
    let (tx, rx) = mpsc::channel(options.event_buffer.max(1));
    let cancel = CancellationToken::new();
    let session = CrawlSession::new(config, client, options, tx, cancel.clone())?;
    let task = tokio::spawn(session.run());

    Ok(SessionHandle {
        events: rx,
        cancel,
        task,
    })
}
