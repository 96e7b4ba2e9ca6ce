//! Section model
//!
//! A [`Section`] is constructed once by a tier loader and never mutated
//! afterwards. Overrides replace the whole value in the resolved mapping, so
//! provenance (`tier`) and `override_allowed` always travel together.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::tier::Tier;
use crate::SCOPE_SEPARATOR;

/// Resolved mapping of section identity to section.
///
/// Ordered by identity so iteration is deterministic.
pub type SectionMap = BTreeMap<String, Section>;

/// SHA-256 digest of a section body, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a body
    pub fn of(body: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(body.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` hex characters, for compact display
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One titled block of tiered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    identity: String,
    title: String,
    body: String,
    level: u8,
    tier: Tier,
    fingerprint: Fingerprint,
    override_allowed: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    annotations: BTreeMap<String, String>,
}

impl Section {
    /// Create a section keyed by its title.
    ///
    /// Levels below 1 are clamped to 1.
    pub fn new(title: impl Into<String>, body: impl Into<String>, level: u8, tier: Tier) -> Self {
        let title = title.into();
        Self::with_identity(title.clone(), title, body.into(), level, tier)
    }

    /// Create a section scoped to a sub-domain, keyed `"<scope>:<title>"`.
    ///
    /// The scope is also recorded as the `scope` annotation.
    pub fn scoped(
        scope: &str,
        title: impl Into<String>,
        body: impl Into<String>,
        level: u8,
        tier: Tier,
    ) -> Self {
        let title = title.into();
        let identity = format!("{}{}{}", scope, SCOPE_SEPARATOR, title);
        Self::with_identity(identity, title, body.into(), level, tier)
            .with_annotation("scope", scope)
    }

    fn with_identity(identity: String, title: String, body: String, level: u8, tier: Tier) -> Self {
        let fingerprint = Fingerprint::of(&body);
        Self {
            identity,
            title,
            body,
            level: level.max(1),
            tier,
            fingerprint,
            override_allowed: true,
            annotations: BTreeMap::new(),
        }
    }

    /// Set the override permission (construction-time only)
    pub fn with_override_allowed(mut self, allowed: bool) -> Self {
        self.override_allowed = allowed;
        self
    }

    /// Attach an auxiliary annotation (construction-time only)
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Tier that last set this section's value
    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Whether a later tier may replace this value
    pub fn override_allowed(&self) -> bool {
        self.override_allowed
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    /// Scope part of a composite identity, if any
    pub fn scope(&self) -> Option<&str> {
        self.annotations.get("scope").map(String::as_str)
    }

    /// True when both sections carry the same body content
    pub fn same_content(&self, other: &Section) -> bool {
        self.fingerprint == other.fingerprint
    }
}
