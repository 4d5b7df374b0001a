use std::path::{Path, PathBuf};

/// The three artifacts written for every target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Plaintext letter to the platform's trust & safety team
    Narrative,
    /// Issue-tracker document
    Markdown,
    /// Machine-readable evidence record
    Evidence,
}

impl ArtifactKind {
    /// Appended to a target's safe name to form the file name
    pub fn file_suffix(self) -> &'static str {
        match self {
            ArtifactKind::Narrative => "_telegram_report.txt",
            ArtifactKind::Markdown => "_github_issue.md",
            ArtifactKind::Evidence => "_evidence.json",
        }
    }

    /// Location of this artifact for `safe_name` inside `case_dir`
    pub fn path_in(self, case_dir: &Path, safe_name: &str) -> PathBuf {
        case_dir.join(format!("{}{}", safe_name, self.file_suffix()))
    }
}
