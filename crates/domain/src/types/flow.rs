//! Login flow state machine
//!
//! `Idle -> PendingCallback -> Exchanged -> Validated -> Bound`, with any
//! non-terminal state able to move to `Failed`. `Bound` and `Failed` are
//! terminal.

use thiserror::Error;

use crate::AuthFlowError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    PendingCallback,
    Exchanged,
    Validated,
    Bound,
    Failed { reason: AuthFlowError },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal login flow transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PendingCallback => "pending_callback",
            Self::Exchanged => "exchanged",
            Self::Validated => "validated",
            Self::Bound => "bound",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Bound | Self::Failed { .. })
    }

    /// Move to `next` if the edge exists.
    pub fn transition(&self, next: FlowState) -> Result<FlowState, InvalidTransition> {
        let allowed = match (self, &next) {
            (Self::Idle, Self::PendingCallback)
            | (Self::PendingCallback, Self::Exchanged)
            | (Self::Exchanged, Self::Validated)
            | (Self::Validated, Self::Bound) => true,
            (current, Self::Failed { .. }) => !current.is_terminal(),
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(InvalidTransition { from: self.name(), to: next.name() })
        }
    }
}
