// src/input.rs - Loading target batches from CSV or JSON files
use std::path::Path;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};
use crate::target::{split_multi_value, RawTarget};

/// Supported input file shapes, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Resolve the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> ReportResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("json") | Some("jsn") => Ok(InputFormat::Json),
            _ => Err(ReportError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// A parsed input file, before its records are flattened
#[derive(Debug, Clone, PartialEq)]
pub enum InputDocument {
    /// Header-row CSV
    Tabular(Vec<RawTarget>),
    /// `{"targets": [...]}`
    Wrapped(Vec<RawTarget>),
    /// `[...]`
    Bare(Vec<RawTarget>),
}

impl InputDocument {
    pub fn into_targets(self) -> Vec<RawTarget> {
        match self {
            InputDocument::Tabular(targets)
            | InputDocument::Wrapped(targets)
            | InputDocument::Bare(targets) => targets,
        }
    }
}

/// One CSV row. Columns may be missing entirely.
#[derive(Debug, Default, Deserialize)]
struct CsvRow {
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    evidence_list: Option<String>,
    #[serde(default)]
    attachments: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl From<CsvRow> for RawTarget {
    fn from(row: CsvRow) -> Self {
        RawTarget {
            target: row.target,
            platform: row.platform,
            kind: row.kind,
            evidence: row.evidence_list.as_deref().map(split_multi_value).unwrap_or_default(),
            attachments: row.attachments.as_deref().map(split_multi_value).unwrap_or_default(),
            notes: row.notes,
        }
    }
}

/// Parse header-row CSV content
pub fn parse_csv(content: &str) -> ReportResult<InputDocument> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let mut targets = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| {
            ReportError::InvalidInput(format!("CSV record {}: {}", index + 1, e))
        })?;
        targets.push(RawTarget::from(row));
    }

    Ok(InputDocument::Tabular(targets))
}

/// Parse JSON content holding either a bare array or a `targets` wrapper
pub fn parse_json(content: &str) -> ReportResult<InputDocument> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| ReportError::InvalidInput(format!("Malformed JSON: {}", e)))?;

    match value {
        Value::Array(_) => {
            let targets = serde_json::from_value(value)
                .map_err(|e| ReportError::InvalidInput(format!("Invalid target record: {}", e)))?;
            Ok(InputDocument::Bare(targets))
        }
        Value::Object(mut object) => match object.remove("targets") {
            Some(targets @ Value::Array(_)) => {
                let targets = serde_json::from_value(targets)
                    .map_err(|e| ReportError::InvalidInput(format!("Invalid target record: {}", e)))?;
                Ok(InputDocument::Wrapped(targets))
            }
            Some(_) => Err(ReportError::InvalidInput(
                "\"targets\" must be an array of target objects".to_string(),
            )),
            None => Err(ReportError::InvalidInput(
                "JSON object has no \"targets\" array".to_string(),
            )),
        },
        _ => Err(ReportError::InvalidInput(
            "JSON input must be an array of targets or an object with a \"targets\" array".to_string(),
        )),
    }
}

/// Parse `content` according to `format`
pub fn parse(content: &str, format: InputFormat) -> ReportResult<InputDocument> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    match format {
        InputFormat::Csv => parse_csv(content),
        InputFormat::Json => parse_json(content),
    }
}

/// Read and parse an input file into raw target records
pub async fn load_targets(path: &Path) -> ReportResult<Vec<RawTarget>> {
    if !path.is_file() {
        return Err(ReportError::InputNotFound(path.to_path_buf()));
    }

    let format = InputFormat::from_path(path)?;
    debug!("Reading {:?} input from {}", format, path.display());

    let content = tokio::fs::read_to_string(path).await
        .map_err(|e| ReportError::file(path, e))?;

    let targets = parse(&content, format)?.into_targets();
    info!("Loaded {} targets from {}", targets.len(), path.display());
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Target;
    use std::path::PathBuf;

    fn normalized(doc: InputDocument) -> Vec<Target> {
        doc.into_targets().into_iter().map(Target::normalize).collect()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.csv")).unwrap(), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("a.JSON")).unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("a.jsn")).unwrap(), InputFormat::Json);
        assert!(matches!(
            InputFormat::from_path(Path::new("a.xlsx")),
            Err(ReportError::UnsupportedFormat { .. })
        ));
        assert!(InputFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_parse_csv_splits_multi_values() {
        let content = "target,platform,type,evidence_list,attachments,notes\n\
            https://t.me/flair,telegram,channel,\"https://t.me/flair/188; https://t.me/flair/189;\",\"screens/1.jpg;screens/2.jpg\",seen twice\n";

        let targets = parse_csv(content).unwrap().into_targets();
        assert_eq!(targets.len(), 1);

        let t = &targets[0];
        assert_eq!(t.target.as_deref(), Some("https://t.me/flair"));
        assert_eq!(t.kind.as_deref(), Some("channel"));
        assert_eq!(t.evidence, vec!["https://t.me/flair/188", "https://t.me/flair/189"]);
        assert_eq!(t.attachments, vec!["screens/1.jpg", "screens/2.jpg"]);
        assert_eq!(t.notes.as_deref(), Some("seen twice"));
    }

    #[test]
    fn test_parse_csv_missing_columns_default() {
        let content = "target,evidence_list\n@someone,scam\n";
        let targets = normalized(parse_csv(content).unwrap());

        assert_eq!(targets[0].identifier, "@someone");
        assert_eq!(targets[0].platform, crate::target::DEFAULT_PLATFORM);
        assert_eq!(targets[0].kind, crate::target::DEFAULT_KIND);
        assert_eq!(targets[0].evidence, vec!["scam"]);
        assert!(targets[0].attachments.is_empty());
    }

    #[test]
    fn test_parse_csv_header_only_is_empty() {
        let content = "target,platform,type,evidence_list,attachments,notes\n";
        assert!(parse_csv(content).unwrap().into_targets().is_empty());
    }

    #[test]
    fn test_wrapped_and_bare_json_normalize_identically() {
        let records = r#"[
            {"target": "https://t.me/a", "platform": "telegram", "type": "channel",
             "evidence": ["porn"], "attachments": ["x.png"], "notes": "n"},
            {"target": "@b", "evidence": "spam; buy now"}
        ]"#;
        let wrapped = format!(r#"{{"targets": {}}}"#, records);

        let bare_doc = parse_json(records).unwrap();
        let wrapped_doc = parse_json(&wrapped).unwrap();
        assert!(matches!(bare_doc, InputDocument::Bare(_)));
        assert!(matches!(wrapped_doc, InputDocument::Wrapped(_)));

        let bare = normalized(bare_doc);
        assert_eq!(bare, normalized(wrapped_doc));
        assert_eq!(bare.len(), 2);
        assert_eq!(bare[1].evidence, vec!["spam", "buy now"]);
    }

    #[test]
    fn test_json_rejects_other_shapes() {
        assert!(matches!(parse_json(r#"{"items": []}"#), Err(ReportError::InvalidInput(_))));
        assert!(matches!(parse_json(r#"{"targets": 3}"#), Err(ReportError::InvalidInput(_))));
        assert!(matches!(parse_json("42"), Err(ReportError::InvalidInput(_))));
        assert!(matches!(parse_json("{not json"), Err(ReportError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_strips_bom() {
        let content = "\u{feff}[{\"target\": \"x\"}]";
        let targets = parse(content, InputFormat::Json).unwrap().into_targets();
        assert_eq!(targets[0].target.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_load_targets_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.csv");
        assert!(matches!(load_targets(&missing).await, Err(ReportError::InputNotFound(_))));

        let unsupported: PathBuf = dir.path().join("targets.txt");
        std::fs::write(&unsupported, "target\nx\n").unwrap();
        assert!(matches!(
            load_targets(&unsupported).await,
            Err(ReportError::UnsupportedFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_targets_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.json");
        std::fs::write(&path, r#"{"targets": [{"target": "a"}, {"target": "b"}]}"#).unwrap();

        let targets = load_targets(&path).await.unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].target.as_deref(), Some("b"));
    }
}
