// src/pipeline.rs - Per-case batch processing
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::Utc;
use indexmap::IndexMap;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::case::CaseId;
use crate::classify::classify;
use crate::error::{ReportError, ReportResult};
use crate::hash::digest_file;
use crate::publish::IssuePublisher;
use crate::reporting::{
    markdown, narrative, timestamp, ArtifactKind, CaseSummary, EvidenceRecord, FailedTarget,
    GeneratedReport, TargetResult,
};
use crate::target::{EnrichedTarget, RawTarget, Target};

/// Name of the per-case summary file
pub const SUMMARY_FILE: &str = "summary.json";

/// Where a processed case ended up
#[derive(Debug, Clone)]
pub struct CaseOutput {
    pub case_dir: PathBuf,
    pub summary: CaseSummary,
}

/// Drives targets through hashing, classification, artifact generation and
/// optional publishing, strictly one target at a time in input order.
pub struct Pipeline {
    output_root: PathBuf,
    publisher: Option<Arc<dyn IssuePublisher>>,
}

impl Pipeline {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            publisher: None,
        }
    }

    /// Publish every generated markdown artifact through `publisher`
    pub fn with_publisher(mut self, publisher: Arc<dyn IssuePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Directory holding every artifact of `case_id`
    pub fn case_dir(&self, case_id: &CaseId) -> PathBuf {
        self.output_root.join(case_id.as_str())
    }

    /// Process a batch and write its summary.
    ///
    /// A target that fails is recorded as a failed result and the batch moves
    /// on. Only failing to create the case directory or to write the summary
    /// aborts the case.
    pub async fn process(&self, targets: Vec<RawTarget>, case_id: &CaseId) -> ReportResult<CaseOutput> {
        let case_dir = self.case_dir(case_id);
        fs::create_dir_all(&case_dir).await
            .map_err(|e| ReportError::file(&case_dir, e))?;

        let mut results = Vec::with_capacity(targets.len());

        for raw in targets {
            let target = Target::normalize(raw);

            match self.process_target(&target, case_id.as_str(), &case_dir).await {
                Ok(report) => {
                    info!(
                        "Generated reports for target: {} -> {}, {}, {}",
                        report.target,
                        file_name(&report.txt),
                        file_name(&report.md),
                        file_name(&report.json),
                    );
                    results.push(TargetResult::Generated(report));
                }
                Err(e) => {
                    error!("Failed to process target {}: {}", target.identifier, e);
                    results.push(TargetResult::Failed(FailedTarget::new(&target, &e)));
                }
            }
        }

        let summary = CaseSummary {
            case_id: case_id.to_string(),
            generated_at: timestamp(Utc::now()),
            targets: results,
        };

        let summary_path = case_dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(&summary_path, json).await
            .map_err(|e| ReportError::file(&summary_path, e))?;

        info!(
            "Case {} processing complete ({} generated, {} failed). Outputs in {}",
            case_id,
            summary.generated_count(),
            summary.failed_count(),
            case_dir.display()
        );

        Ok(CaseOutput { case_dir, summary })
    }

    async fn process_target(&self, target: &Target, case_id: &str, case_dir: &Path) -> ReportResult<GeneratedReport> {
        let attachment_hashes = hash_attachments(&target.attachments).await;
        let classification = classify(&target.evidence);
        debug!("Classified {} as {}", target.identifier, classification);

        let enriched = EnrichedTarget::new(target.clone(), classification, attachment_hashes);

        let text = narrative::build(case_id, &enriched);
        let md = markdown::build(case_id, &enriched);
        let record = EvidenceRecord::build(case_id, &enriched, Utc::now());
        let record_json = serde_json::to_string_pretty(&record)?;

        let safe_name = target.safe_name();
        let txt_path = ArtifactKind::Narrative.path_in(case_dir, &safe_name);
        let md_path = ArtifactKind::Markdown.path_in(case_dir, &safe_name);
        let json_path = ArtifactKind::Evidence.path_in(case_dir, &safe_name);

        write_artifact(&txt_path, &text).await?;
        write_artifact(&md_path, &md).await?;
        write_artifact(&json_path, &record_json).await?;

        let mut report = GeneratedReport {
            target: target.identifier.clone(),
            platform: target.platform.clone(),
            kind: target.kind.clone(),
            txt: txt_path,
            md: md_path,
            json: json_path,
            classification,
            attachment_hashes: enriched.attachment_hashes().clone(),
            issue_url: None,
            publish_error: None,
        };

        if let Some(publisher) = &self.publisher {
            self.publish(publisher.as_ref(), case_id, &enriched, &md, &mut report).await;
        }

        Ok(report)
    }

    /// Create the remote issue and link it from the markdown artifact.
    /// Failures are logged and recorded on the report, never propagated.
    async fn publish(
        &self,
        publisher: &dyn IssuePublisher,
        case_id: &str,
        enriched: &EnrichedTarget,
        md: &str,
        report: &mut GeneratedReport,
    ) {
        let title = markdown::issue_title(enriched);
        let body = markdown::issue_body(case_id, md);

        match publisher.create_issue(&title, &body).await {
            Ok(issue) => {
                info!("Issue created for {}: {}", report.target, issue.url);
                let amended = markdown::with_issue_link(md, &issue.url);
                if let Err(e) = fs::write(&report.md, amended).await {
                    error!("Failed to add issue link to {}: {}", report.md.display(), e);
                    report.publish_error = Some(format!("issue created but markdown not updated: {}", e));
                }
                report.issue_url = Some(issue.url);
            }
            Err(e) => {
                warn!(
                    "Issue creation failed for {}: {} (code {:?})",
                    report.target,
                    e,
                    e.status_code()
                );
                report.publish_error = Some(e.to_string());
            }
        }
    }
}

/// Digest every attachment once, keeping input order. Unreadable files get no digest.
async fn hash_attachments(attachments: &[String]) -> IndexMap<String, Option<String>> {
    let mut hashes = IndexMap::with_capacity(attachments.len());

    for path in attachments {
        if hashes.contains_key(path) {
            continue;
        }

        let digest = match digest_file(Path::new(path)).await {
            Ok(digest) => digest,
            Err(e) => {
                warn!("Could not hash attachment {}: {}", path, e);
                None
            }
        };

        if digest.is_none() {
            debug!("No digest for attachment {}", path);
        }
        hashes.insert(path.clone(), digest);
    }

    hashes
}

async fn write_artifact(path: &Path, content: &str) -> ReportResult<()> {
    if fs::try_exists(path).await.unwrap_or(false) {
        warn!("Overwriting existing artifact {}", path.display());
    }

    fs::write(path, content).await
        .map_err(|e| ReportError::file(path, e))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
