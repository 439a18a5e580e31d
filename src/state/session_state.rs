/// Session lifecycle definitions
///
/// A crawl session moves `Pending -> Running` once, then ends in exactly one
/// of the terminal states.
use std::fmt;

/// Represents the lifecycle state of one crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    // ===== Active States =====
    /// Session is created but has not seeded its frontier yet
    Pending,

    /// Session is fetching pages
    Running,

    // ===== Terminal States =====
    /// Frontier drained or page budget reached; `complete` was emitted
    Completed,

    /// Unrecoverable failure; a terminal `error` was emitted
    Failed,

    /// Client cancelled or disconnected; nothing further is emitted
    Cancelled,
}

impl SessionState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns true if the session may still emit events
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if `next` is a legal successor of this state
    ///
    /// Cancellation is legal from any active state; every other edge follows
    /// `Pending -> Running -> {Completed | Failed}`. A session that fails
    /// validation before running may go straight from `Pending` to `Failed`.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }

    /// Returns the lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all possible session states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Running,
            Self::Completed,
            Self::Failed,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
