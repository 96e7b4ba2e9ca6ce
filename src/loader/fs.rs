//! Filesystem tier material
//!
//! Layout:
//! - universal: `<universal_root>/core.md` and `<universal_root>/languages/*.md`
//! - organization: `<project>/.tiered/organization/standards.md`
//! - project: `<project>/.tiered/project/overrides.md`
//! - individual: `<project>/.tiered/project/individual/<username>.md`
//!
//! Each tier directory may hold a `config.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tiered_section::{split_sections, Section, SectionMap, Tier};
use walkdir::WalkDir;

use super::{collect_sections, LoadError, TierLoader};
use crate::config::{PolicyConfig, TierConfig};

/// Directory under the project holding organization and project material
pub const TIERED_DIR: &str = ".tiered";

/// Config file name inside each tier directory
pub const CONFIG_FILE: &str = "config.toml";

/// Where each tier's material lives on disk
#[derive(Debug, Clone)]
pub struct SourceLayout {
    /// Universal material root
    pub universal_root: PathBuf,

    /// Project directory
    pub project_dir: PathBuf,

    /// Developer whose individual file is read (None disables the lookup)
    pub username: Option<String>,
}

impl SourceLayout {
    pub fn new(universal_root: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            universal_root: universal_root.into(),
            project_dir: project_dir.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    /// Default universal root: `$HOME/.config/tiered-doc/universal`
    pub fn default_universal_root() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/tiered-doc/universal")
    }

    pub fn organization_dir(&self) -> PathBuf {
        self.project_dir.join(TIERED_DIR).join("organization")
    }

    pub fn project_tier_dir(&self) -> PathBuf {
        self.project_dir.join(TIERED_DIR).join("project")
    }

    /// Directory tier-specific config lives in (individual has none)
    pub fn config_path(&self, tier: Tier) -> Option<PathBuf> {
        match tier {
            Tier::Universal => Some(self.universal_root.join(CONFIG_FILE)),
            Tier::Organization => Some(self.organization_dir().join(CONFIG_FILE)),
            Tier::Project => Some(self.project_tier_dir().join(CONFIG_FILE)),
            Tier::Individual => None,
        }
    }

    /// Load the policy from the tier config files
    pub fn load_policy(&self) -> Result<PolicyConfig, crate::config::ConfigError> {
        let universal = self.config_path(Tier::Universal);
        let organization = self.config_path(Tier::Organization);
        let project = self.config_path(Tier::Project);
        PolicyConfig::build(
            universal.as_deref(),
            organization.as_deref(),
            project.as_deref(),
        )
    }

    /// Main material file for a tier
    pub fn material_path(&self, tier: Tier) -> Option<PathBuf> {
        match tier {
            Tier::Universal => Some(self.universal_root.join("core.md")),
            Tier::Organization => Some(self.organization_dir().join("standards.md")),
            Tier::Project => Some(self.project_tier_dir().join("overrides.md")),
            Tier::Individual => self
                .username
                .as_ref()
                .map(|user| self.project_tier_dir().join("individual").join(format!("{}.md", user))),
        }
    }
}

/// Loader reading tier material from a [`SourceLayout`]
#[derive(Debug, Clone)]
pub struct FsTierLoader {
    layout: SourceLayout,
    policy: PolicyConfig,
}

impl FsTierLoader {
    pub fn new(layout: SourceLayout, policy: PolicyConfig) -> Self {
        Self { layout, policy }
    }

    fn read_text(tier: Tier, path: &Path) -> Result<Option<String>, LoadError> {
        match fs::read(path) {
            Ok(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| {
                LoadError::unavailable(tier, format!("{} is not valid UTF-8", path.display()))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LoadError::unavailable(
                tier,
                format!("cannot read {}: {}", path.display(), e),
            )),
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn load_universal(&self, config: &TierConfig) -> Result<SectionMap, LoadError> {
        let tier = Tier::Universal;
        let root = &self.layout.universal_root;
        if !root.is_dir() {
            return Err(LoadError::unavailable(
                tier,
                format!("universal root {} does not exist", root.display()),
            ));
        }

        let core = root.join("core.md");
        let text = Self::read_text(tier, &core)?.ok_or_else(|| {
            LoadError::unavailable(tier, format!("{} does not exist", core.display()))
        })?;

        let mut map = SectionMap::new();
        let file = Self::file_name(&core);
        collect_sections(
            &mut map,
            split_sections(&text).into_iter().map(|raw| {
                let locked = config.is_locked(&raw.title);
                raw.into_section(tier)
                    .with_override_allowed(!locked)
                    .with_annotation("file", file.clone())
            }),
        );

        let languages = root.join("languages");
        if languages.is_dir() {
            for entry in WalkDir::new(&languages)
                .min_depth(1)
                .max_depth(1)
                .follow_links(false)
                .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            {
                let entry = entry.map_err(|e| {
                    LoadError::unavailable(tier, format!("cannot list {}: {}", languages.display(), e))
                })?;
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|e| e.to_str()) != Some("md")
                {
                    continue;
                }
                let Some(language) = path.file_stem().map(|s| s.to_string_lossy().to_string())
                else {
                    continue;
                };
                let Some(text) = Self::read_text(tier, path)? else {
                    continue;
                };
                let file = format!("languages/{}", Self::file_name(path));
                collect_sections(
                    &mut map,
                    split_sections(&text).into_iter().map(|raw| {
                        let locked = config.is_locked(&raw.title);
                        raw.into_scoped_section(&language, tier)
                            .with_override_allowed(!locked)
                            .with_annotation("language", language.clone())
                            .with_annotation("file", file.clone())
                    }),
                );
            }
        }

        Ok(map)
    }

    fn load_file(&self, tier: Tier, path: &Path, config: &TierConfig) -> Result<SectionMap, LoadError> {
        let mut map = SectionMap::new();
        let Some(text) = Self::read_text(tier, path)? else {
            tracing::debug!(tier = %tier, path = %path.display(), "no material for tier");
            return Ok(map);
        };

        let file = Self::file_name(path);
        collect_sections(
            &mut map,
            split_sections(&text).into_iter().map(|raw| {
                let locked = config.is_locked(&raw.title);
                Section::new(raw.title, raw.body, raw.level, tier)
                    .with_override_allowed(!locked)
                    .with_annotation("file", file.clone())
            }),
        );
        Ok(map)
    }
}

impl TierLoader for FsTierLoader {
    fn load(&self, tier: Tier) -> Result<SectionMap, LoadError> {
        let config = self.policy.tier(tier);
        match tier {
            Tier::Universal => self.load_universal(&config),
            Tier::Individual => {
                let Some(user) = self.layout.username.as_deref() else {
                    return Ok(SectionMap::new());
                };
                if user.is_empty() || user.contains(['/', '\\']) || user.starts_with('.') {
                    return Err(LoadError::unavailable(tier, format!("invalid username {:?}", user)));
                }
                match self.layout.material_path(tier) {
                    Some(path) => self.load_file(tier, &path, &config),
                    None => Ok(SectionMap::new()),
                }
            }
            Tier::Organization | Tier::Project => match self.layout.material_path(tier) {
                Some(path) => self.load_file(tier, &path, &config),
                None => Ok(SectionMap::new()),
            },
        }
    }
}
