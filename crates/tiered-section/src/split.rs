//! Heading splitter
//!
//! Turns markdown-like text into an ordered list of `{title, body, level}`
//! blocks. Pure function: no I/O, no tier knowledge.

use regex_lite::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::section::Section;
use crate::tier::Tier;

/// A headed block of text before it is attributed to a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawSection {
    /// Heading text without the `#` markers
    pub title: String,
    /// Trimmed text between this heading and the next
    pub body: String,
    /// Number of `#` markers (1-6)
    pub level: u8,
}

impl RawSection {
    /// Attribute this block to a tier, keyed by title
    pub fn into_section(self, tier: Tier) -> Section {
        Section::new(self.title, self.body, self.level, tier)
    }

    /// Attribute this block to a tier under a scope, keyed `"<scope>:<title>"`
    pub fn into_scoped_section(self, scope: &str, tier: Tier) -> Section {
        Section::scoped(scope, self.title, self.body, self.level, tier)
    }
}

fn heading_pattern() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| {
        Regex::new(r"^(#{1,6})[ \t]+(.*\S)[ \t]*$").expect("heading pattern compiles")
    })
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    line.len() - trimmed.len() <= 3 && (trimmed.starts_with("```") || trimmed.starts_with("~~~"))
}

/// Split text into headed sections.
///
/// Text before the first heading is dropped. Heading-like lines inside
/// fenced code blocks are kept as body text.
pub fn split_sections(text: &str) -> Vec<RawSection> {
    let mut sections = Vec::new();
    let mut current: Option<(String, u8)> = None;
    let mut body: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some(caps) = heading_pattern().captures(line) {
                if let Some((title, level)) = current.take() {
                    sections.push(RawSection {
                        title,
                        body: body.join("\n").trim().to_string(),
                        level,
                    });
                }
                body.clear();
                current = Some((caps[2].to_string(), caps[1].len() as u8));
                continue;
            }
        }
        body.push(line);
    }

    if let Some((title, level)) = current {
        sections.push(RawSection {
            title,
            body: body.join("\n").trim().to_string(),
            level,
        });
    }

    sections
}
