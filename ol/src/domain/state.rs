//! Pipeline run state machine
//!
//! `NotStarted → Extracting → Transformed → Loaded` on the success path. Any
//! non-terminal state may move to `Failed`, which is terminal. There is no
//! resume: a new run starts again from `NotStarted`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Phase;

/// State of a single pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RunState {
    #[default]
    NotStarted,
    Extracting,
    Transformed,
    Loaded,
    Failed { phase: Phase, reason: String },
}

impl RunState {
    /// Whether the run can make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Loaded | Self::Failed { .. })
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        debug!(from = ?self, to = ?next, "RunState::can_transition_to: called");
        match (self, next) {
            (Self::NotStarted, Self::Extracting) => true,
            (Self::Extracting, Self::Transformed) => true,
            (Self::Transformed, Self::Loaded) => true,
            (from, Self::Failed { .. }) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Move to `next`, returning `None` for an illegal transition
    pub fn advance(&self, next: RunState) -> Option<RunState> {
        if self.can_transition_to(&next) {
            Some(next)
        } else {
            debug!(from = ?self, to = ?next, "RunState::advance: rejected transition");
            None
        }
    }

    /// Phase that failed, if the run failed
    pub fn failed_phase(&self) -> Option<Phase> {
        match self {
            Self::Failed { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Extracting => write!(f, "extracting"),
            Self::Transformed => write!(f, "transformed"),
            Self::Loaded => write!(f, "loaded"),
            Self::Failed { phase, reason } => write!(f, "failed during {}: {}", phase, reason),
        }
    }
}
