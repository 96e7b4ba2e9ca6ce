//! End-to-end pipeline tests against on-disk tier trees

mod fixtures;

use fixtures::TierTree;
use std::fs;
use tiered_doc::{diff, Pipeline, PipelineError, PipelineState, Tier};

const CORE: &str = "# Code Style\nUse the formatter.\n\n# Security\nNo secrets in git.\n\n# Experimental Features\nTry things.\n";

const LOCKED_SECURITY: &str = "locked_sections = [\"Security\"]\n";

// =============================================================================
// Commit mode
// =============================================================================

#[test]
fn test_commit_writes_resolved_document() {
    let tree = TierTree::new()
        .universal(CORE)
        .organization("# Review\nTwo approvals.\n")
        .project("# Code Style\nFour spaces.\n");

    let outcome = Pipeline::new(tree.config()).run().unwrap();

    let written = outcome.written.as_ref().unwrap();
    assert_eq!(written.path, tree.destination());
    assert!(written.backup.is_none());

    let document = tree.read_destination();
    assert_eq!(document, outcome.document);
    assert!(document.starts_with("<!-- Generated by tiered-doc"));
    assert!(document.contains("# Code Style\n\nFour spaces.\n"));
    assert!(document.contains("# Review\n\nTwo approvals.\n"));
    assert!(!document.contains("Use the formatter."));

    assert_eq!(
        outcome.trail.states(),
        vec![
            PipelineState::Loading,
            PipelineState::Resolving,
            PipelineState::PolicyCheck,
            PipelineState::Write
        ]
    );
}

#[test]
fn test_commit_twice_is_byte_identical() {
    let tree = TierTree::new()
        .universal(CORE)
        .organization("# Review\nTwo approvals.\n")
        .project("# Code Style\nFour spaces.\n");

    let first = Pipeline::new(tree.config()).run().unwrap();
    let first_doc = tree.read_destination();
    let second = Pipeline::new(tree.config()).run().unwrap();
    let second_doc = tree.read_destination();

    assert_eq!(first_doc, second_doc);
    assert!(diff(first.sections(), second.sections()).is_unchanged());
    // Second run backed up the first document unchanged
    assert_eq!(fs::read_to_string(tree.backup()).unwrap(), first_doc);
}

#[test]
fn test_single_backup_kept_across_commits() {
    let tree = TierTree::new().universal("# A\none\n");
    Pipeline::new(tree.config()).run().unwrap();
    let first = tree.read_destination();

    let tree = tree.project("# A\ntwo\n");
    Pipeline::new(tree.config()).run().unwrap();
    let second = tree.read_destination();
    assert_eq!(fs::read_to_string(tree.backup()).unwrap(), first);

    let tree = tree.project("# A\nthree\n");
    let outcome = Pipeline::new(tree.config()).run().unwrap();
    assert_eq!(outcome.written.unwrap().backup, Some(tree.backup()));
    assert_eq!(fs::read_to_string(tree.backup()).unwrap(), second);
    assert!(tree.read_destination().contains("three"));
}

#[test]
fn test_atomic_commit_keeps_backup_copy() {
    let tree = TierTree::new().universal("# A\none\n");
    Pipeline::new(tree.config()).run().unwrap();
    let first = tree.read_destination();

    let tree = tree.project("# A\ntwo\n");
    let mut config = tree.config();
    config.atomic = true;
    Pipeline::new(config).run().unwrap();

    assert_eq!(fs::read_to_string(tree.backup()).unwrap(), first);
    assert!(tree.read_destination().contains("two"));
}

// =============================================================================
// Policy enforcement
// =============================================================================

#[test]
fn test_commit_blocked_by_policy_violation() {
    let tree = TierTree::new()
        .universal(CORE)
        .organization("# Security\nOrg security policy.\n")
        .organization_config(LOCKED_SECURITY)
        .project("# Security\nWe skip reviews.\n");

    let err = Pipeline::new(tree.config()).run().unwrap_err();

    assert_eq!(err.exit_code(), 3);
    match &err {
        PipelineError::PolicyViolation { violations } => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].identity, "Security");
            assert_eq!(violations[0].attempted_by, Tier::Project);
        }
        other => panic!("expected policy violation, got {:?}", other),
    }
    assert!(!tree.destination().exists());
}

#[test]
fn test_blocked_commit_leaves_existing_document() {
    let tree = TierTree::new().universal(CORE);
    Pipeline::new(tree.config()).run().unwrap();
    let before = tree.read_destination();

    let tree = tree
        .organization("# Security\nOrg security policy.\n")
        .organization_config(LOCKED_SECURITY)
        .project("# Security\nWe skip reviews.\n");
    assert!(Pipeline::new(tree.config()).run().is_err());

    assert_eq!(tree.read_destination(), before);
    assert!(!tree.backup().exists());
}

#[test]
fn test_force_writes_despite_violation() {
    let tree = TierTree::new()
        .universal(CORE)
        .organization("# Security\nOrg security policy.\n")
        .organization_config(LOCKED_SECURITY)
        .project("# Security\nWe skip reviews.\n");

    let mut config = tree.config();
    config.acknowledge_violations = true;
    let outcome = Pipeline::new(config).run().unwrap();

    assert!(outcome.report.has_violations());
    let document = tree.read_destination();
    assert!(document.contains("Org security policy."));
    assert!(!document.contains("We skip reviews."));
}

// =============================================================================
// Dry run
// =============================================================================

#[test]
fn test_dry_run_never_writes_destination() {
    let tree = TierTree::new()
        .universal(CORE)
        .organization("# Security\nOrg security policy.\n")
        .organization_config(LOCKED_SECURITY)
        .project("# Security\nWe skip reviews.\n");

    let outcome = Pipeline::new(tree.dry_run_config()).run().unwrap();

    assert!(!tree.destination().exists());
    assert!(outcome.written.is_none());
    assert_eq!(outcome.report.counts.policy_violations, 1);
    assert_eq!(
        outcome.trail.current(),
        PipelineState::DryRunReport
    );

    let artifacts = outcome.dry_run.unwrap();
    assert_eq!(artifacts.report, tree.report_dir().join("dry-run-report.txt"));
    assert_eq!(artifacts.preview, tree.report_dir().join("CONTEXT.md.preview"));

    let report = fs::read_to_string(&artifacts.report).unwrap();
    assert!(report.contains("TIERED DOCUMENT DRY RUN REPORT"));
    assert!(report.contains("! Section: Security"));
    assert!(report.contains("  Attempted by: project"));
    assert_eq!(fs::read_to_string(&artifacts.preview).unwrap(), outcome.document);
}

#[test]
fn test_dry_run_leaves_existing_document_untouched() {
    let tree = TierTree::new().universal("# A\none\n");
    Pipeline::new(tree.config()).run().unwrap();
    let before = tree.read_destination();

    let tree = tree.project("# A\ntwo\n");
    let outcome = Pipeline::new(tree.dry_run_config()).run().unwrap();

    assert_eq!(outcome.report.counts.modified, 1);
    assert_eq!(tree.read_destination(), before);
    assert!(!tree.backup().exists());
}

// =============================================================================
// Tiers and configuration
// =============================================================================

#[test]
fn test_missing_universal_is_fatal() {
    let tree = TierTree::new().project("# A\nproject only\n");

    let err = Pipeline::new(tree.config()).run().unwrap_err();
    assert!(matches!(err, PipelineError::LoaderUnavailable(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(!tree.destination().exists());
}

#[test]
fn test_malformed_config_is_fatal() {
    let tree = TierTree::new()
        .universal(CORE)
        .project_config("primary_role = [not toml");

    let err = Pipeline::new(tree.config()).run().unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_role_filter_from_config() {
    let tree = TierTree::new()
        .universal(CORE)
        .organization_config("[roles.backend]\nexclude_sections = [\"experimental\"]\n")
        .project_config("primary_role = \"backend\"\n");

    let outcome = Pipeline::new(tree.config()).run().unwrap();

    assert!(!outcome.sections().contains_key("Experimental Features"));
    assert!(outcome.baseline.contains_key("Experimental Features"));
    assert_eq!(outcome.resolution.role_removed, vec!["Experimental Features"]);
    assert_eq!(outcome.report.counts.removed, 1);
    assert_eq!(outcome.report.removed[0].identity, "Experimental Features");
}

#[test]
fn test_role_flag_overrides_config() {
    let tree = TierTree::new()
        .universal(CORE)
        .organization_config("[roles.backend]\nexclude_sections = [\"experimental\"]\n")
        .project_config("primary_role = \"backend\"\n");

    let mut config = tree.config();
    config.role = Some("fullstack".to_string());
    let outcome = Pipeline::new(config).run().unwrap();

    assert!(outcome.sections().contains_key("Experimental Features"));
    assert!(outcome.resolution.role_removed.is_empty());
}

#[test]
fn test_individual_tier_requires_project_switch() {
    let tree = TierTree::new()
        .universal(CORE)
        .project("# Editor\nTeam default.\n")
        .individual("alice", "# Editor\nvim\n\n# Code Style\nTabs.\n");

    let mut config = tree.config();
    config.username = Some("alice".to_string());
    let outcome = Pipeline::new(config.clone()).run().unwrap();
    assert_eq!(outcome.sections()["Editor"].body(), "Team default.");

    let tree = tree.project_config("[individual_overrides]\nenabled = true\n");
    let outcome = Pipeline::new(config).run().unwrap();
    assert_eq!(outcome.sections()["Editor"].body(), "vim");
    assert_eq!(outcome.sections()["Editor"].tier(), Tier::Individual);
    // Universal-only section stays out of reach for individuals
    assert_eq!(outcome.sections()["Code Style"].tier(), Tier::Universal);
    assert!(tree.read_destination().contains("vim"));
}

#[test]
fn test_language_sections_are_scoped() {
    let tree = TierTree::new()
        .universal(CORE)
        .language("rust", "# Code Style\nRun rustfmt.\n");

    let outcome = Pipeline::new(tree.config()).run().unwrap();

    let rust = &outcome.sections()["rust:Code Style"];
    assert_eq!(rust.title(), "Code Style");
    assert_eq!(rust.annotations().get("language").map(String::as_str), Some("rust"));
    assert_eq!(outcome.sections()["Code Style"].body(), "Use the formatter.");
}

#[test]
fn test_provenance_comments() {
    let tree = TierTree::new()
        .universal(CORE)
        .project("# Code Style\nFour spaces.\n");

    let mut config = tree.config();
    config.provenance = true;
    Pipeline::new(config).run().unwrap();

    let document = tree.read_destination();
    assert!(document.contains("<!-- source=project, fingerprint="));
    assert!(document.contains("<!-- source=universal, fingerprint="));
}
