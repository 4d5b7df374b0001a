use std::path::PathBuf;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::classify::Classification;
use crate::target::{EnrichedTarget, Target};

/// Timestamp format used across artifacts, e.g. `2024-05-01T10:00:00.123456Z`
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Structured evidence artifact
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceRecord {
    pub case_id: String,
    pub generated_at: String,
    pub target: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub classification: Classification,
    pub evidence: Vec<String>,
    pub attachments: Vec<AttachmentDigest>,
    pub notes: String,
}

/// One attachment path with its digest, `null` when unavailable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentDigest {
    pub path: String,
    pub sha256: Option<String>,
}

impl EvidenceRecord {
    /// Build the structured record for an enriched target
    pub fn build(case_id: &str, enriched: &EnrichedTarget, generated_at: DateTime<Utc>) -> Self {
        let target = enriched.target();
        Self {
            case_id: case_id.to_string(),
            generated_at: timestamp(generated_at),
            target: target.identifier.clone(),
            platform: target.platform.clone(),
            kind: target.kind.clone(),
            classification: enriched.classification(),
            evidence: target.evidence.clone(),
            attachments: enriched
                .attachments()
                .map(|(path, digest)| AttachmentDigest {
                    path: path.to_string(),
                    sha256: digest.map(str::to_string),
                })
                .collect(),
            notes: target.notes.clone().unwrap_or_default(),
        }
    }
}

/// Per-target entry of a case summary
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TargetResult {
    Generated(GeneratedReport),
    Failed(FailedTarget),
}

impl TargetResult {
    pub fn identifier(&self) -> &str {
        match self {
            TargetResult::Generated(report) => &report.target,
            TargetResult::Failed(failed) => &failed.target,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, TargetResult::Generated(_))
    }
}

/// A target whose artifacts were all written
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub target: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub txt: PathBuf,
    pub md: PathBuf,
    pub json: PathBuf,
    pub classification: Classification,
    pub attachment_hashes: IndexMap<String, Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_error: Option<String>,
}

/// A target that could not be processed; the batch carried on without it
#[derive(Debug, Clone, Serialize)]
pub struct FailedTarget {
    pub target: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub error: String,
}

impl FailedTarget {
    pub fn new(target: &Target, error: impl std::fmt::Display) -> Self {
        Self {
            target: target.identifier.clone(),
            platform: target.platform.clone(),
            kind: target.kind.clone(),
            error: error.to_string(),
        }
    }
}

/// Final durable output of a case, written as `summary.json`
#[derive(Debug, Clone, Serialize)]
pub struct CaseSummary {
    pub case_id: String,
    pub generated_at: String,
    pub targets: Vec<TargetResult>,
}

impl CaseSummary {
    pub fn generated_count(&self) -> usize {
        self.targets.iter().filter(|r| r.is_generated()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.targets.len() - self.generated_count()
    }
}
