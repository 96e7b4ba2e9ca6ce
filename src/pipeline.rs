//! Resolution pipeline
//!
//! Orchestrates one run for one destination:
//! - Load every tier (universal is required, the rest degrade to empty)
//! - Fold the tiers, filtering by role after the organization tier
//! - Diff against the universal baseline
//! - Dry run: persist report and preview, never touch the destination
//! - Commit: gate on policy violations, back up, then write
//!
//! The document is rendered fully in memory before any destination write.

use std::path::PathBuf;

use thiserror::Error;
use tiered_section::{SectionMap, Tier};

use crate::audit::{audit, ChangeReport};
use crate::config::{ConfigError, PolicyConfig};
use crate::loader::{FsTierLoader, LoadError, SourceLayout, TierLoader};
use crate::render::{render, RenderOptions};
use crate::resolve::{resolve, PolicyViolation, Resolution, TierStack};
use crate::state::{PipelineState, StateError, StateTrail};
use crate::writer::{self, DestinationError, DryRunArtifacts, WriteOutcome};

/// Default resolved document file name
pub const DEFAULT_OUTPUT: &str = "CONTEXT.md";

fn describe_violations(violations: &[PolicyViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} (attempted by {})", v.identity, v.attempted_by))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("loader unavailable: {0}")]
    LoaderUnavailable(#[from] LoadError),

    #[error(
        "policy violations prevent write: {}; run with --dry-run to see details",
        describe_violations(.violations)
    )]
    PolicyViolation { violations: Vec<PolicyViolation> },

    #[error("destination write failure: {0}")]
    DestinationWriteFailure(#[from] DestinationError),

    #[error("state error: {0}")]
    State(#[from] StateError),
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 1,
            PipelineError::LoaderUnavailable(_) => 2,
            PipelineError::PolicyViolation { .. } => 3,
            PipelineError::DestinationWriteFailure(_) => 4,
            PipelineError::State(_) => 1,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Project directory (destination and `.tiered/` live here)
    pub project_dir: PathBuf,

    /// Universal material root
    pub universal_root: PathBuf,

    /// Resolved document file name, relative to the project directory
    pub output_name: String,

    /// Developer for the individual tier
    pub username: Option<String>,

    /// Active role, overriding the project config
    pub role: Option<String>,

    /// Produce a report and preview instead of writing
    pub dry_run: bool,

    /// Write even when policy violations were recorded
    pub acknowledge_violations: bool,

    /// Annotate each section with its source tier and fingerprint
    pub provenance: bool,

    /// Replace the destination with write-then-rename
    pub atomic: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            universal_root: SourceLayout::default_universal_root(),
            output_name: DEFAULT_OUTPUT.to_string(),
            username: None,
            role: None,
            dry_run: false,
            acknowledge_violations: false,
            provenance: false,
            atomic: false,
        }
    }
}

impl PipelineConfig {
    /// Filesystem layout derived from this config
    pub fn layout(&self) -> SourceLayout {
        SourceLayout::new(&self.universal_root, &self.project_dir)
            .with_username(self.username.clone())
    }

    /// Path of the resolved document
    pub fn destination(&self) -> PathBuf {
        self.project_dir.join(&self.output_name)
    }

    /// Directory for dry-run report and preview
    pub fn report_dir(&self) -> PathBuf {
        self.layout().project_tier_dir()
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Universal tier as loaded, the diff baseline
    pub baseline: SectionMap,

    /// Fold result
    pub resolution: Resolution,

    /// Baseline vs resolved diff plus recorded violations
    pub report: ChangeReport,

    /// Rendered resolved document
    pub document: String,

    /// Dry-run artifacts, when in dry-run mode
    pub dry_run: Option<DryRunArtifacts>,

    /// Committed write, when not in dry-run mode
    pub written: Option<WriteOutcome>,

    /// States passed through
    pub trail: StateTrail,
}

impl PipelineOutcome {
    pub fn sections(&self) -> &SectionMap {
        &self.resolution.sections
    }
}

/// Pipeline execution context
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run against the filesystem layout
    pub fn run(&self) -> PipelineResult<PipelineOutcome> {
        let layout = self.config.layout();
        let policy = layout.load_policy()?;
        let loader = FsTierLoader::new(layout, policy.clone());
        self.run_with_loader(&loader, policy)
    }

    /// Run against any loader with an explicit policy
    pub fn run_with_loader(
        &self,
        loader: &dyn TierLoader,
        policy: PolicyConfig,
    ) -> PipelineResult<PipelineOutcome> {
        let mut trail = StateTrail::new();
        let policy = match &self.config.role {
            Some(role) => policy.with_role(role.clone()),
            None => policy,
        };

        tracing::info!(
            dry_run = self.config.dry_run,
            role = %policy.active_role,
            "starting resolution"
        );

        let stack = match self.load_tiers(loader, &policy) {
            Ok(stack) => stack,
            Err(e) => {
                tracing::error!("{}", e);
                trail.transition(PipelineState::Aborted)?;
                return Err(e);
            }
        };

        trail.transition(PipelineState::Resolving)?;
        let baseline = stack.get(Tier::Universal).cloned().unwrap_or_default();
        let exclusions = policy.exclusions();
        let resolution = resolve(&stack, exclusions.as_ref());
        let document = render(
            &resolution.sections,
            RenderOptions {
                provenance: self.config.provenance,
            },
        );
        let report = audit(&baseline, &resolution.sections, &resolution.violations);

        let mut outcome = PipelineOutcome {
            baseline,
            resolution,
            report,
            document,
            dry_run: None,
            written: None,
            trail,
        };

        if self.config.dry_run {
            outcome.trail.transition(PipelineState::DryRunReport)?;
            let text = outcome.report.to_text(&outcome.document);
            let artifacts = writer::write_dry_run(
                &self.config.report_dir(),
                &self.config.destination(),
                &text,
                &outcome.document,
            )?;
            tracing::info!(
                violations = outcome.report.counts.policy_violations,
                "dry run complete"
            );
            outcome.dry_run = Some(artifacts);
            return Ok(outcome);
        }

        outcome.trail.transition(PipelineState::PolicyCheck)?;
        if outcome.report.has_violations() {
            if self.config.acknowledge_violations {
                for v in &outcome.report.policy_violations {
                    tracing::warn!(
                        section = %v.identity,
                        attempted_by = %v.attempted_by,
                        "writing despite policy violation: {}",
                        v.policy
                    );
                }
            } else {
                tracing::error!("Policy violations detected. Write aborted.");
                for v in &outcome.report.policy_violations {
                    tracing::error!(section = %v.identity, attempted_by = %v.attempted_by, "{}", v.policy);
                }
                outcome.trail.transition(PipelineState::Aborted)?;
                return Err(PipelineError::PolicyViolation {
                    violations: outcome.report.policy_violations.clone(),
                });
            }
        }

        outcome.trail.transition(PipelineState::Write)?;
        let destination = self.config.destination();
        let written = if self.config.atomic {
            writer::write_atomic(&destination, &outcome.document)?
        } else {
            writer::write_document(&destination, &outcome.document)?
        };
        outcome.written = Some(written);

        Ok(outcome)
    }

    /// Load all tiers into a stack.
    ///
    /// A universal loader error is fatal. Other tiers that fail to load
    /// contribute nothing.
    fn load_tiers(&self, loader: &dyn TierLoader, policy: &PolicyConfig) -> PipelineResult<TierStack> {
        let mut stack = TierStack::new();

        for tier in Tier::ORDER {
            if tier == Tier::Individual && !self.individual_enabled(policy) {
                stack.insert(tier, SectionMap::new());
                continue;
            }

            match loader.load(tier) {
                Ok(sections) => {
                    if tier == Tier::Universal && sections.is_empty() {
                        tracing::warn!("universal tier supplied no sections");
                    }
                    tracing::info!(tier = %tier, sections = sections.len(), "loaded tier");
                    stack.insert(tier, sections);
                }
                Err(e) if tier == Tier::Universal => {
                    return Err(PipelineError::LoaderUnavailable(e));
                }
                Err(e) => {
                    tracing::warn!("{}; tier contributes nothing", e);
                    stack.insert(tier, SectionMap::new());
                }
            }
        }

        Ok(stack)
    }

    fn individual_enabled(&self, policy: &PolicyConfig) -> bool {
        match (&self.config.username, policy.individual_enabled) {
            (Some(_), true) => true,
            (None, _) => {
                tracing::debug!("no username supplied, individual tier skipped");
                false
            }
            (Some(_), false) => {
                tracing::debug!("individual overrides disabled by project config");
                false
            }
        }
    }
}
