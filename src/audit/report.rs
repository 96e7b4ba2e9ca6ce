//! Human-readable dry-run report

use super::{ChangeItem, ChangeReport};

/// Lines of the resolved document shown in the report preview
pub const PREVIEW_LINES: usize = 50;

/// Width of the banner rules
pub const REPORT_RULE_WIDTH: usize = 60;

fn tier_label(item: &ChangeItem, before: bool) -> &'static str {
    let tier = if before { item.tier_before } else { item.tier_after };
    tier.map(|t| t.as_str()).unwrap_or("-")
}

impl ChangeReport {
    /// Counts block shared by the report and the console summary
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Added sections: {}", self.counts.added),
            format!("Removed sections: {}", self.counts.removed),
            format!("Modified sections: {}", self.counts.modified),
            format!("Reaffirmed sections: {}", self.counts.reaffirmed),
            format!("Policy violations: {}", self.counts.policy_violations),
        ]
    }

    /// Render the full report followed by a truncated preview of `document`
    pub fn to_text(&self, document: &str) -> String {
        let rule = "=".repeat(REPORT_RULE_WIDTH);
        let sub = "-".repeat(20);
        let mut out = Vec::new();

        out.push(rule.clone());
        out.push("TIERED DOCUMENT DRY RUN REPORT".to_string());
        out.push(rule);
        out.push(format!(
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push(String::new());

        out.push("SUMMARY".to_string());
        out.push(sub.clone());
        out.extend(self.summary_lines());
        out.push(String::new());

        if !self.added.is_empty() {
            out.push("ADDED SECTIONS".to_string());
            out.push(sub.clone());
            for item in &self.added {
                out.push(format!("+ {} (from: {})", item.title, tier_label(item, false)));
            }
            out.push(String::new());
        }

        if !self.removed.is_empty() {
            out.push("REMOVED SECTIONS".to_string());
            out.push(sub.clone());
            for item in &self.removed {
                out.push(format!("- {} (was from: {})", item.title, tier_label(item, true)));
            }
            out.push(String::new());
        }

        if !self.modified.is_empty() {
            out.push("MODIFIED SECTIONS".to_string());
            out.push(sub.clone());
            for item in &self.modified {
                out.push(format!("~ {}", item.title));
                out.push(format!("  Before: {}", tier_label(item, true)));
                out.push(format!("  After: {}", tier_label(item, false)));
            }
            out.push(String::new());
        }

        if !self.reaffirmed.is_empty() {
            out.push("REAFFIRMED SECTIONS".to_string());
            out.push(sub.clone());
            for item in &self.reaffirmed {
                out.push(format!(
                    "= {} (reaffirmed by: {}, was: {})",
                    item.title,
                    tier_label(item, false),
                    tier_label(item, true)
                ));
            }
            out.push(String::new());
        }

        if !self.policy_violations.is_empty() {
            out.push("POLICY VIOLATIONS".to_string());
            out.push(sub.clone());
            for violation in &self.policy_violations {
                out.push(format!("! Section: {}", violation.identity));
                out.push(format!("  Policy: {}", violation.policy));
                out.push(format!("  Attempted by: {}", violation.attempted_by));
            }
            out.push(String::new());
        }

        out.push(format!("PREVIEW (first {} lines)", PREVIEW_LINES));
        out.push(sub);
        let lines: Vec<&str> = document.lines().collect();
        out.extend(lines.iter().take(PREVIEW_LINES).map(|l| l.to_string()));
        if lines.len() > PREVIEW_LINES {
            out.push("... (truncated)".to_string());
        }

        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}
