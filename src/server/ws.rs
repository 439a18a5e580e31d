//! One WebSocket connection = one crawl session

use crate::config::normalize_request;
use crate::crawler::{spawn_session, SessionHandle};
use crate::protocol::{decode_control, decode_request, encode_event, ControlMessage, ProtocolEvent};
use crate::server::AppState;
use crate::{CrawlRequest, ProtocolError, SkeinError};
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

type WsSender = SplitSink<WebSocket, Message>;

/// Drives one connection from its request frame to the close frame
pub(crate) async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let request = match read_request(&mut socket).await {
        Ok(Some(request)) => request,
        Ok(None) => {
            debug!("Connection closed before a crawl request arrived");
            return;
        }
        Err(e) => {
            warn!("Rejecting connection: {}", e);
            reject(socket, format!("Invalid request: {}", e)).await;
            return;
        }
    };

    let config = match normalize_request(&request) {
        Ok(config) => config,
        Err(e) => {
            warn!("Rejecting crawl of {:?}: {}", request.url, e);
            reject(socket, format!("Config Error: {}", e)).await;
            return;
        }
    };

    let handle = match spawn_session(config, state.client.clone(), state.options) {
        Ok(handle) => handle,
        Err(e) => {
            warn!("Could not start session for {:?}: {}", request.url, e);
            reject(socket, format!("Config Error: {}", e)).await;
            return;
        }
    };

    info!("Session started for {}", request.url);
    let (sender, receiver) = socket.split();
    relay(handle, sender, receiver).await;
}

/// Waits for the first text frame and decodes it as a crawl request
///
/// Returns `Ok(None)` if the client went away first.
async fn read_request(socket: &mut WebSocket) -> Result<Option<CrawlRequest>, ProtocolError> {
    while let Some(frame) = socket.recv().await {
        match frame {
            Ok(Message::Text(text)) => return decode_request(&text).map(Some),
            Ok(Message::Binary(_)) => return Err(ProtocolError::UnexpectedBinary),
            Ok(Message::Close(_)) | Err(_) => return Ok(None),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
        }
    }
    Ok(None)
}

/// Sends one terminal error and closes
async fn reject(mut socket: WebSocket, message: String) {
    if let Ok(frame) = encode_event(&ProtocolEvent::fatal_error(message)) {
        if socket.send(Message::Text(frame)).await.is_ok() {
            let _ = socket.send(Message::Close(None)).await;
        }
    }
}

/// Forwards session events until the terminal event, a cancel, or a disconnect
async fn relay(
    handle: SessionHandle,
    mut sender: WsSender,
    mut receiver: SplitStream<WebSocket>,
) {
    let SessionHandle {
        mut events,
        cancel,
        task,
    } = handle;

    let finished = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break false;
                };
                let terminal = event.is_terminal();
                if let Err(e) = send_event(&mut sender, &event).await {
                    debug!("Client went away while sending {}: {}", event.kind(), e);
                    cancel.cancel();
                    break false;
                }
                if terminal {
                    break true;
                }
            }
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if decode_control(&text) == Some(ControlMessage::Cancel) {
                        info!("Client cancelled the crawl");
                        cancel.cancel();
                        break false;
                    }
                    debug!("Ignoring inbound frame after request");
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    info!("Client disconnected; cancelling crawl");
                    cancel.cancel();
                    break false;
                }
                Some(Ok(_)) => {}
            },
        }
    };

    if finished {
        let _ = sender.send(Message::Close(None)).await;
    }

    match task.await {
        Ok(report) => info!(
            "Session ended {} with {} pages",
            report.state, report.pages_fetched
        ),
        Err(e) => warn!("Session task ended abnormally: {}", e),
    }
}

async fn send_event(sender: &mut WsSender, event: &ProtocolEvent) -> Result<(), SkeinError> {
    let frame = encode_event(event)?;
    sender
        .send(Message::Text(frame))
        .await
        .map_err(|e| SkeinError::SessionFailure(format!("send failed: {}", e)))
}
