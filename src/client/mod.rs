//! Client side of the session protocol
//!
//! # Components
//!
//! - `reducer`: pure state machine turning events into UI-facing state
//! - `connection`: WebSocket subscription built on the reducer

mod connection;
mod reducer;

pub use connection::{start_crawl, CrawlSubscription};
pub use reducer::{
    cancelled, fold_events, reduce, transport_closed, ClientState, CrawlPhase, Progress,
};

use crate::ProtocolError;
use thiserror::Error;

/// Errors seen by a crawl client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("WebSocket Connection Failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server reported a terminal error
    #[error("{0}")]
    CrawlFailed(String),

    #[error("Connection closed before the crawl finished")]
    TransportClosed,

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("Client task stopped unexpectedly")]
    TaskGone,
}
