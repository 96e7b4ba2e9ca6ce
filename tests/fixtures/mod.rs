//! Test fixtures: on-disk tier trees in a temp directory
//!
//! Layout mirrors what `SourceLayout` reads:
//! - `<root>/universal/core.md` (+ `languages/*.md`, `config.toml`)
//! - `<root>/project/.tiered/organization/{standards.md,config.toml}`
//! - `<root>/project/.tiered/project/{overrides.md,config.toml}`
//! - `<root>/project/.tiered/project/individual/<user>.md`

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tiered_doc::PipelineConfig;

pub struct TierTree {
    dir: TempDir,
}

impl TierTree {
    pub fn new() -> Self {
        let tree = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fs::create_dir_all(tree.universal_root()).unwrap();
        fs::create_dir_all(tree.project_dir()).unwrap();
        tree
    }

    pub fn universal_root(&self) -> PathBuf {
        self.dir.path().join("universal")
    }

    pub fn project_dir(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    pub fn destination(&self) -> PathBuf {
        self.project_dir().join("CONTEXT.md")
    }

    pub fn backup(&self) -> PathBuf {
        self.project_dir().join("CONTEXT.md.backup")
    }

    pub fn report_dir(&self) -> PathBuf {
        self.project_dir().join(".tiered/project")
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn universal(self, core: &str) -> Self {
        Self::write(&self.universal_root().join("core.md"), core);
        self
    }

    pub fn language(self, name: &str, text: &str) -> Self {
        Self::write(
            &self.universal_root().join("languages").join(format!("{}.md", name)),
            text,
        );
        self
    }

    pub fn organization(self, standards: &str) -> Self {
        Self::write(
            &self.project_dir().join(".tiered/organization/standards.md"),
            standards,
        );
        self
    }

    pub fn organization_config(self, toml: &str) -> Self {
        Self::write(
            &self.project_dir().join(".tiered/organization/config.toml"),
            toml,
        );
        self
    }

    pub fn project(self, overrides: &str) -> Self {
        Self::write(&self.report_dir().join("overrides.md"), overrides);
        self
    }

    pub fn project_config(self, toml: &str) -> Self {
        Self::write(&self.report_dir().join("config.toml"), toml);
        self
    }

    pub fn individual(self, user: &str, text: &str) -> Self {
        Self::write(
            &self.report_dir().join("individual").join(format!("{}.md", user)),
            text,
        );
        self
    }

    /// Commit-mode pipeline config for this tree
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            project_dir: self.project_dir(),
            universal_root: self.universal_root(),
            ..PipelineConfig::default()
        }
    }

    pub fn dry_run_config(&self) -> PipelineConfig {
        PipelineConfig {
            dry_run: true,
            ..self.config()
        }
    }

    pub fn read_destination(&self) -> String {
        fs::read_to_string(self.destination()).unwrap()
    }
}
