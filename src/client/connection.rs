//! WebSocket subscription to a remote crawl session
//!
//! [`start_crawl`] connects, sends the request and returns a
//! [`CrawlSubscription`]: a stream of intermediate events plus a separate
//! outcome that resolves exactly once, derived by folding those events with
//! the reducer.

use crate::client::reducer::{self, ClientState, CrawlPhase};
use crate::client::ClientError;
use crate::config::CrawlRequest;
use crate::protocol::{decode_event, encode_control, encode_request, ControlMessage, ProtocolEvent};
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// A running remote crawl
pub struct CrawlSubscription {
    events: mpsc::UnboundedReceiver<ProtocolEvent>,
    outcome: oneshot::Receiver<ClientState>,
    cancel: CancellationToken,
}

impl CrawlSubscription {
    /// Next intermediate or terminal event; `None` once the connection is done
    pub async fn next_event(&mut self) -> Option<ProtocolEvent> {
        self.events.recv().await
    }

    /// Sends `{"type":"cancel"}` and resolves the outcome as cancelled
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this subscription when triggered
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the final state of the crawl
    ///
    /// Resolves `Ok` only when a `complete` event arrived.
    pub async fn outcome(self) -> Result<ClientState, ClientError> {
        let state = self.outcome.await.map_err(|_| ClientError::TaskGone)?;
        match &state.phase {
            CrawlPhase::Completed => Ok(state),
            CrawlPhase::Failed(message) => Err(ClientError::CrawlFailed(message.clone())),
            CrawlPhase::Cancelled => Err(ClientError::Cancelled),
            CrawlPhase::Running => Err(ClientError::TransportClosed),
        }
    }
}

/// Connects to `server_url` (e.g. `ws://127.0.0.1:8000/ws/crawl`) and starts a crawl
///
/// # Errors
///
/// Fails if the connection cannot be opened or the request cannot be sent.
/// Everything after that is reported through the subscription.
pub async fn start_crawl(
    server_url: &str,
    request: &CrawlRequest,
) -> Result<CrawlSubscription, ClientError> {
    let (mut socket, _response) = connect_async(server_url).await?;
    debug!("Connected to {}", server_url);

    let frame = encode_request(request)?;
    socket.send(Message::Text(frame)).await?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let cancel = CancellationToken::new();

    let state = ClientState::starting(&request.url);
    tokio::spawn(pump(socket, state, events_tx, outcome_tx, cancel.clone()));

    Ok(CrawlSubscription {
        events: events_rx,
        outcome: outcome_rx,
        cancel,
    })
}

/// Reads frames, folds them into `state` and forwards them until terminal
async fn pump(
    mut socket: Socket,
    mut state: ClientState,
    events: mpsc::UnboundedSender<ProtocolEvent>,
    outcome: oneshot::Sender<ClientState>,
    cancel: CancellationToken,
) {
    while !state.is_terminal() {
        let frame = tokio::select! {
            _ = cancel.cancelled() => {
                if let Ok(control) = encode_control(ControlMessage::Cancel) {
                    if let Err(e) = socket.send(Message::Text(control)).await {
                        debug!("Could not deliver cancel: {}", e);
                    }
                }
                state = reducer::cancelled(state);
                break;
            }
            frame = socket.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => match decode_event(&text) {
                Ok(event) => {
                    state = reducer::reduce(state, &event);
                    // The caller may only care about the outcome
                    let _ = events.send(event);
                }
                Err(e) => warn!("Ignoring undecodable frame: {}", e),
            },
            Some(Ok(Message::Close(_))) | None => {
                state = reducer::transport_closed(state);
            }
            Some(Err(e)) => {
                debug!("Connection error: {}", e);
                state = reducer::transport_closed(state);
            }
            Some(Ok(_)) => {}
        }
    }

    let _ = socket.close(None).await;
    drop(events);
    let _ = outcome.send(state);
}
