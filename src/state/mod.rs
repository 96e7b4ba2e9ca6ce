//! Resolution pipeline state machine
//!
//! LOADING → RESOLVING → {DRY_RUN_REPORT | POLICY_CHECK} → {WRITE | ABORTED}
//!
//! A fatal loader error moves LOADING straight to ABORTED.

mod pipeline_state;

pub use pipeline_state::{PipelineState, StateError, StateTrail};

/// Check if a state is terminal (no further transitions possible)
pub trait TerminalState {
    fn is_terminal(&self) -> bool;
}
