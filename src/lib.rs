//! Tiered document resolver
//!
//! This crate builds one resolved context document from four tiers of
//! guidance (universal, organization, project, individual). Later tiers
//! override earlier ones section by section, locked organization sections
//! reject overrides as policy violations, and a role filter trims sections
//! the active role does not need. Every run can be previewed as a dry run
//! with a change report before the destination is touched.

pub mod audit;
pub mod config;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod resolve;
pub mod state;
pub mod writer;

pub use audit::{audit, diff, ChangeCounts, ChangeItem, ChangeReport};
pub use config::{ConfigError, PolicyConfig, RoleExclusions, TierConfig};
pub use filter::filter;
pub use loader::{FsTierLoader, LoadError, MemoryTierLoader, SourceLayout, TierLoader};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineOutcome, PipelineResult};
pub use render::{render, RenderOptions};
pub use resolve::{resolve, PolicyViolation, Resolution, TierStack};
pub use state::{PipelineState, StateTrail};
pub use tiered_section::{split_sections, Fingerprint, Section, SectionMap, Tier};
pub use writer::{DestinationError, DryRunArtifacts, WriteOutcome};
