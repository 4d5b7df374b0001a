// src/reporting/markdown.rs - Issue-tracker document
use crate::target::EnrichedTarget;

use super::narrative::UNAVAILABLE;

/// Build the markdown issue document
pub fn build(case_id: &str, enriched: &EnrichedTarget) -> String {
    let target = enriched.target();
    let mut md: Vec<String> = Vec::new();

    md.push(format!("# 🚨 OpenICE Abuse Report — {}", case_id));
    md.push(String::new());
    md.push(format!("**Target**: {}", target.identifier));
    md.push(format!("**Platform**: {}", target.platform));
    md.push(format!("**Type**: {}", target.kind));
    md.push(format!("**Classification**: `{}`", enriched.classification()));
    md.push(String::new());

    md.push("## Evidence".to_string());
    for item in &target.evidence {
        md.push(format!("- {}", item));
    }

    if !target.attachments.is_empty() {
        md.push(String::new());
        md.push("## Attachments (local)".to_string());
        for (path, digest) in enriched.attachments() {
            md.push(format!("- {} (sha256: `{}`)", path, digest.unwrap_or(UNAVAILABLE)));
        }
    }

    if let Some(notes) = &target.notes {
        md.push(String::new());
        md.push("## Notes".to_string());
        md.push(notes.clone());
    }

    md.push(String::new());
    md.push("**Generated by OpenICE**".to_string());

    md.join("\n")
}

/// Title used when publishing the issue
pub fn issue_title(enriched: &EnrichedTarget) -> String {
    format!("OpenICE Abuse Report — {}", enriched.target().identifier)
}

/// Markdown artifact plus the case attribution footer
pub fn issue_body(case_id: &str, markdown: &str) -> String {
    format!("{}\n\n_Auto-generated by OpenICE — case: {}_", markdown, case_id)
}

/// Markdown artifact amended with the published issue location
pub fn with_issue_link(markdown: &str, issue_url: &str) -> String {
    format!("{}\n\n**GitHub Issue:** {}\n", markdown, issue_url)
}
