//! Resolved document renderer
//!
//! Sections are ordered by heading level, then identity, so identical
//! inputs always render byte-identical output.

use tiered_section::{Section, SectionMap};

/// First line of every resolved document
pub const BANNER: &str = "<!-- Generated by tiered-doc from tiered sources. Do not edit directly. -->";

/// Rendering switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append `<!-- source=<tier>, fingerprint=<digest> -->` after each section
    pub provenance: bool,
}

/// Sections in output order: level ascending, then identity ascending
pub fn ordered(sections: &SectionMap) -> Vec<&Section> {
    let mut ordered: Vec<&Section> = sections.values().collect();
    ordered.sort_by(|a, b| {
        a.level()
            .cmp(&b.level())
            .then_with(|| a.identity().cmp(b.identity()))
    });
    ordered
}

/// Provenance comment for one section
pub fn provenance_comment(section: &Section) -> String {
    format!(
        "<!-- source={}, fingerprint={} -->",
        section.tier(),
        section.fingerprint()
    )
}

/// Render the resolved mapping into the final document
pub fn render(sections: &SectionMap, options: RenderOptions) -> String {
    let mut out = vec![BANNER.to_string(), String::new()];

    for section in ordered(sections) {
        out.push(format!(
            "{} {}",
            "#".repeat(usize::from(section.level())),
            section.title()
        ));
        out.push(String::new());

        if !section.body().is_empty() {
            out.push(section.body().to_string());
            out.push(String::new());
        }

        if options.provenance {
            out.push(provenance_comment(section));
            out.push(String::new());
        }
    }

    let mut document = out.join("\n");
    if !document.ends_with('\n') {
        document.push('\n');
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiered_section::Tier;

    fn map(sections: Vec<Section>) -> SectionMap {
        sections
            .into_iter()
            .map(|s| (s.identity().to_string(), s))
            .collect()
    }

    #[test]
    fn test_order_by_level_then_identity() {
        let sections = map(vec![
            Section::new("Zeta", "z", 1, Tier::Universal),
            Section::new("Alpha", "a", 2, Tier::Universal),
            Section::new("Beta", "b", 1, Tier::Project),
        ]);
        let titles: Vec<&str> = ordered(&sections).iter().map(|s| s.title()).collect();
        assert_eq!(titles, vec!["Beta", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_render_layout() {
        let sections = map(vec![
            Section::new("Intro", "Hello.", 1, Tier::Universal),
            Section::new("Empty", "", 2, Tier::Universal),
        ]);
        let document = render(&sections, RenderOptions::default());
        let expected = format!("{}\n\n# Intro\n\nHello.\n\n## Empty\n", BANNER);
        assert_eq!(document, expected);
    }

    #[test]
    fn test_render_with_provenance() {
        let section = Section::new("Intro", "Hello.", 1, Tier::Organization);
        let fingerprint = section.fingerprint().to_string();
        let document = render(&map(vec![section]), RenderOptions { provenance: true });
        assert!(document.contains(&format!(
            "<!-- source=organization, fingerprint={} -->",
            fingerprint
        )));
    }

    #[test]
    fn test_render_is_deterministic() {
        let sections = map(vec![
            Section::new("B", "2", 1, Tier::Universal),
            Section::scoped("rust", "B", "3", 1, Tier::Universal),
        ]);
        assert_eq!(
            render(&sections, RenderOptions::default()),
            render(&sections.clone(), RenderOptions::default())
        );
    }

    #[test]
    fn test_render_empty_mapping() {
        assert_eq!(render(&SectionMap::new(), RenderOptions::default()), format!("{}\n", BANNER));
    }
}
