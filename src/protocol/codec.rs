//! JSON wire codec for protocol events and inbound messages

use crate::config::CrawlRequest;
use crate::protocol::types::{ControlMessage, ProtocolEvent};
use crate::ProtocolError;

/// Serializes an event into one text frame
pub fn encode_event(event: &ProtocolEvent) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(event)?)
}

/// Parses one text frame into an event
pub fn decode_event(frame: &str) -> Result<ProtocolEvent, ProtocolError> {
    Ok(serde_json::from_str(frame)?)
}

/// Serializes a crawl request into one text frame
pub fn encode_request(request: &CrawlRequest) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(request)?)
}

/// Parses the first inbound frame of a connection
///
/// Unknown fields are ignored and missing optional fields stay unset so the
/// normalizer can apply its defaults.
pub fn decode_request(frame: &str) -> Result<CrawlRequest, ProtocolError> {
    Ok(serde_json::from_str(frame)?)
}

/// Serializes a control message
pub fn encode_control(control: ControlMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(&control)?)
}

/// Parses an inbound frame received after the crawl request
///
/// Returns `None` for anything that is not a recognised control message.
pub fn decode_control(frame: &str) -> Option<ControlMessage> {
    serde_json::from_str(frame).ok()
}
