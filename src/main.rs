//! Skein main entry point
//!
//! This is the command-line interface for the Skein crawler: it runs the
//! WebSocket server, or drives a single crawl in-process or against a server.

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use skein::client::{self, ClientState, CrawlPhase};
use skein::config::{load_config_or_default, normalize_request, CrawlConfig, CrawlRequest, ServerConfig};
use skein::crawler::{build_http_client, spawn_session, SessionHandle, SessionOptions};
use skein::output::{print_statistics, write_text_report, CrawlStatistics};
use skein::protocol::ProtocolEvent;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Skein: a live, depth-bounded website crawler
///
/// Skein walks a website breadth-first under depth, page, domain and
/// pattern bounds and streams its progress over a WebSocket.
#[derive(Parser, Debug)]
#[command(name = "skein")]
#[command(version)]
#[command(about = "A live, depth-bounded website crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the WebSocket server
    Serve {
        /// Address to listen on, overrides the config file
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Crawl a site and print the results
    Crawl {
        #[command(flatten)]
        request: RequestArgs,

        /// Crawl through a running server instead of in-process
        #[arg(long, value_name = "WS_URL")]
        server: Option<String>,

        /// Write the plain-text export to this file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// Validate a crawl request and show the normalized configuration
    Check {
        #[command(flatten)]
        request: RequestArgs,
    },
}

/// Crawl request fields; anything left out gets the default
#[derive(Args, Debug)]
struct RequestArgs {
    /// Start URL
    url: String,

    #[arg(long)]
    max_depth: Option<i64>,

    #[arg(long)]
    max_pages: Option<i64>,

    /// CSS selector for link nodes
    #[arg(long, value_name = "CSS")]
    link_selector: Option<String>,

    /// CSS selector for the content node
    #[arg(long, value_name = "CSS")]
    content_selector: Option<String>,

    /// Follow links to other hosts
    #[arg(long)]
    any_domain: bool,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<i64>,

    /// Only follow URLs matching this regex
    #[arg(long, value_name = "REGEX")]
    include: Option<String>,

    /// Never follow URLs matching this regex
    #[arg(long, value_name = "REGEX")]
    exclude: Option<String>,
}

impl RequestArgs {
    fn to_request(&self) -> CrawlRequest {
        CrawlRequest {
            url: self.url.clone(),
            max_depth: self.max_depth,
            max_pages: self.max_pages,
            match_pattern: self.link_selector.clone(),
            content_css: self.content_selector.clone(),
            same_domain: self.any_domain.then_some(false),
            timeout: self.timeout,
            url_regex: self.include.clone(),
            exclude_regex: self.exclude.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Command::Serve { bind } => handle_serve(config, bind).await,
        Command::Crawl {
            request,
            server,
            export,
        } => handle_crawl(&config, request.to_request(), server, export).await,
        Command::Check { request } => handle_check(&request.to_request()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skein=info,warn"),
            1 => EnvFilter::new("skein=debug,tower_http=debug,info"),
            2 => EnvFilter::new("skein=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn handle_serve(mut config: ServerConfig, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    skein::server::run_server(&config).await?;
    Ok(())
}

/// Handles the check command: validates the request and shows the canonical config
fn handle_check(request: &CrawlRequest) -> anyhow::Result<()> {
    let config = normalize_request(request).context("Invalid crawl request")?;

    println!("=== Skein Crawl Check ===\n");
    print_config(&config);
    Ok(())
}

fn print_config(config: &CrawlConfig) {
    println!("Crawl Configuration:");
    println!("  Start URL: {}", config.start_url);
    println!("  Max depth: {}", config.max_depth);
    println!("  Max pages: {}", config.max_pages);
    println!("  Link selector: {}", config.link_selector);
    println!("  Content selector: {}", config.content_selector);
    println!(
        "  Same domain only: {}{}",
        config.same_domain_only,
        config
            .allowed_host()
            .map(|h| format!(" ({})", h))
            .unwrap_or_default()
    );
    println!(
        "  Per-request timeout: {}ms",
        config.per_request_timeout.as_millis()
    );
    if let Some(include) = &config.include_pattern {
        println!("  Include pattern: {}", include);
    }
    if let Some(exclude) = &config.exclude_pattern {
        println!("  Exclude pattern: {}", exclude);
    }
}

/// Handles the crawl command
async fn handle_crawl(
    server_config: &ServerConfig,
    request: CrawlRequest,
    server: Option<String>,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = normalize_request(&request).context("Invalid crawl request")?;

    let state = match server {
        Some(server_url) => crawl_remote(&server_url, &request).await?,
        None => crawl_local(server_config, config.clone()).await?,
    };

    match &state.phase {
        CrawlPhase::Completed => {
            println!();
            for article in &state.results {
                match &article.error {
                    Some(error) => println!("  [error] {} ({})", article.url, error),
                    None => println!(
                        "  {} - {}",
                        article.url,
                        article.title.as_deref().unwrap_or("No Title")
                    ),
                }
            }
            println!();
            print_statistics(&CrawlStatistics::from_articles(&state.results));

            if let Some(path) = export {
                write_text_report(&state.results, &config, Utc::now().date_naive(), &path)
                    .with_context(|| format!("Failed to write export to {}", path.display()))?;
                tracing::info!("Export written to {}", path.display());
            }
            Ok(())
        }
        CrawlPhase::Failed(message) => anyhow::bail!("Crawl failed: {}", message),
        CrawlPhase::Cancelled => {
            tracing::warn!("Crawl cancelled");
            Ok(())
        }
        CrawlPhase::Running => anyhow::bail!("Crawl ended without a result"),
    }
}

/// Runs the session in this process and folds its events like a remote client would
async fn crawl_local(server_config: &ServerConfig, config: CrawlConfig) -> anyhow::Result<ClientState> {
    let http = build_http_client(&server_config.user_agent, &server_config.crawler)?;
    let start_url = config.start_url.to_string();
    let SessionHandle {
        mut events,
        cancel,
        task,
    } = spawn_session(config, http, SessionOptions::from(&server_config.crawler))?;

    let mut state = ClientState::starting(&start_url);
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    log_event(&event);
                    state = client::reduce(state, &event);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, cancelling crawl");
                cancel.cancel();
                state = client::cancelled(state);
                break;
            }
        }
    }

    let report = task.await.context("Session task failed")?;
    tracing::debug!(
        "Session ended {} after {} pages",
        report.state,
        report.pages_fetched
    );
    Ok(client::transport_closed(state))
}

async fn crawl_remote(server_url: &str, request: &CrawlRequest) -> anyhow::Result<ClientState> {
    let mut subscription = client::start_crawl(server_url, request)
        .await
        .with_context(|| format!("Failed to connect to {}", server_url))?;

    let cancel = subscription.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, cancelling crawl");
            cancel.cancel();
        }
    });

    while let Some(event) = subscription.next_event().await {
        log_event(&event);
    }

    match subscription.outcome().await {
        Ok(state) => Ok(state),
        Err(client::ClientError::CrawlFailed(message)) => {
            let mut state = ClientState::starting(&request.url);
            state.phase = CrawlPhase::Failed(message);
            Ok(state)
        }
        Err(client::ClientError::Cancelled) => {
            Ok(client::cancelled(ClientState::starting(&request.url)))
        }
        Err(e) => Err(e.into()),
    }
}

fn log_event(event: &ProtocolEvent) {
    match event {
        ProtocolEvent::Status { message } => tracing::info!("{}", message),
        ProtocolEvent::Found { message, .. } => tracing::info!("{}", message),
        ProtocolEvent::Progress {
            current,
            total,
            last_scraped,
        } => tracing::info!("[{}/{}] {}", current, total, last_scraped),
        ProtocolEvent::Error { message, fatal } => {
            if *fatal {
                tracing::error!("{}", message);
            } else {
                tracing::warn!("{}", message);
            }
        }
        ProtocolEvent::Complete { data } => tracing::info!("Crawl complete: {} pages", data.len()),
    }
}
