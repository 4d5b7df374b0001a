// src/reporting/narrative.rs - Plaintext abuse letter
use crate::target::EnrichedTarget;

/// Shown in place of a digest when an attachment could not be hashed
pub const UNAVAILABLE: &str = "unavailable";

/// Build the plaintext report addressed to the target platform's trust & safety team
pub fn build(case_id: &str, enriched: &EnrichedTarget) -> String {
    let target = enriched.target();
    let platform = display_platform(&target.platform);
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("Subject: Abuse Report – {} – {}", case_id, target.identifier));
    lines.push(String::new());
    lines.push(format!("Hello {} Trust & Safety,", platform));
    lines.push(String::new());
    lines.push(format!(
        "I would like to report the following entity which appears to violate {}'s Terms of Service.",
        platform
    ));
    lines.push(String::new());
    lines.push(format!("Target: {}", target.identifier));
    lines.push(format!("Platform: {}", target.platform));
    lines.push(format!("Type: {}", target.kind));
    lines.push(format!("Classification: {}", enriched.classification()));
    lines.push(String::new());

    lines.push("Evidence / Links:".to_string());
    for item in &target.evidence {
        lines.push(format!(" - {}", item));
    }
    lines.push(String::new());

    if !target.attachments.is_empty() {
        lines.push("Attachments (local paths):".to_string());
        for (path, digest) in enriched.attachments() {
            lines.push(format!(" - {} (sha256: {})", path, digest.unwrap_or(UNAVAILABLE)));
        }
    }

    if let Some(notes) = &target.notes {
        lines.push(String::new());
        lines.push("Notes:".to_string());
        lines.push(notes.clone());
    }

    lines.push(String::new());
    lines.push(
        "I confirm I did NOT download any suspicious files; this report is based on observed posts and screenshots."
            .to_string(),
    );
    lines.push(String::new());
    lines.push("Please investigate and take appropriate action.".to_string());
    lines.push(String::new());
    lines.push("Sincerely,".to_string());
    lines.push("OpenICE Reporting".to_string());
    lines.push(String::new());

    lines.join("\n")
}

/// "telegram" -> "Telegram"
fn display_platform(platform: &str) -> String {
    let mut chars = platform.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
