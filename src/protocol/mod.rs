//! Session protocol: message shapes and their JSON encoding
//!
//! A client opens a connection and sends one [`crate::config::CrawlRequest`].
//! The server answers with zero or more `status`, `found`, `progress` and
//! non-fatal `error` frames, then exactly one `complete` or fatal `error`
//! frame, then closes. The client may send `{"type":"cancel"}` at any time.

mod codec;
mod types;

pub use codec::{
    decode_control, decode_event, decode_request, encode_control, encode_event, encode_request,
};
pub use types::{Article, ControlMessage, ProtocolEvent};
