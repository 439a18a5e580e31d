//! State module for tracking crawl session lifecycle
//!
//! # Components
//!
//! - `SessionState`: Pending, Running, and the three terminal outcomes

mod session_state;

pub use session_state::SessionState;
