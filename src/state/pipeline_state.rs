//! Pipeline states and the recorded trail of transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TerminalState;

/// Pipeline state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    /// Reading tier material and configuration
    Loading,
    /// Folding tiers into the resolved mapping
    Resolving,
    /// Producing the dry-run report and preview
    DryRunReport,
    /// Gating a committed write on policy violations
    PolicyCheck,
    /// Writing the resolved document
    Write,
    /// Run failed without writing
    Aborted,
}

impl TerminalState for PipelineState {
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::DryRunReport | PipelineState::Write | PipelineState::Aborted
        )
    }
}

impl PipelineState {
    /// Check if transition from this state to target is valid
    pub fn can_transition_to(&self, target: PipelineState) -> bool {
        match (self, target) {
            (PipelineState::Loading, PipelineState::Resolving) => true,
            (PipelineState::Loading, PipelineState::Aborted) => true,

            (PipelineState::Resolving, PipelineState::DryRunReport) => true,
            (PipelineState::Resolving, PipelineState::PolicyCheck) => true,

            (PipelineState::PolicyCheck, PipelineState::Write) => true,
            (PipelineState::PolicyCheck, PipelineState::Aborted) => true,

            // Terminal states cannot transition
            _ => false,
        }
    }
}

/// Errors for state transitions
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },

    #[error("Pipeline is in terminal state {0:?}")]
    Terminal(PipelineState),
}

/// One recorded state entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateEntry {
    pub state: PipelineState,
    pub entered_at: DateTime<Utc>,
}

/// States a run has passed through, starting at LOADING
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTrail {
    entries: Vec<StateEntry>,
}

impl Default for StateTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTrail {
    pub fn new() -> Self {
        Self {
            entries: vec![StateEntry {
                state: PipelineState::Loading,
                entered_at: Utc::now(),
            }],
        }
    }

    /// Current state
    pub fn current(&self) -> PipelineState {
        self.entries
            .last()
            .map(|e| e.state)
            .unwrap_or(PipelineState::Loading)
    }

    /// Transition to a new state
    pub fn transition(&mut self, next: PipelineState) -> Result<(), StateError> {
        let current = self.current();
        if current.is_terminal() {
            return Err(StateError::Terminal(current));
        }
        if !current.can_transition_to(next) {
            return Err(StateError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        tracing::debug!(from = ?current, to = ?next, "pipeline transition");
        self.entries.push(StateEntry {
            state: next,
            entered_at: Utc::now(),
        });
        Ok(())
    }

    /// States visited, in order
    pub fn states(&self) -> Vec<PipelineState> {
        self.entries.iter().map(|e| e.state).collect()
    }
}
