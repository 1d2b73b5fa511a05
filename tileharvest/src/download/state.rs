//! Per-tile lifecycle state.

use std::fmt;

/// Lifecycle of one tile within a job.
///
/// ```text
/// Pending ──► InFlight ──► Succeeded
///    │            ├──────► Failed
///    └────────────┴──────► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileState {
    #[default]
    Pending,
    InFlight,
    Succeeded,
    Failed,
    Cancelled,
}

impl TileState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TileState::Succeeded | TileState::Failed | TileState::Cancelled
        )
    }

    /// Whether moving from `self` to `next` is allowed. Transitions are one-way.
    pub fn can_transition_to(self, next: TileState) -> bool {
        matches!(
            (self, next),
            (TileState::Pending, TileState::InFlight)
                | (TileState::Pending, TileState::Cancelled)
                | (TileState::InFlight, TileState::Succeeded)
                | (TileState::InFlight, TileState::Failed)
                | (TileState::InFlight, TileState::Cancelled)
        )
    }
}

impl fmt::Display for TileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TileState::Pending => "pending",
            TileState::InFlight => "in flight",
            TileState::Succeeded => "succeeded",
            TileState::Failed => "failed",
            TileState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}
