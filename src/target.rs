// src/target.rs - Target records, raw and canonical
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::classify::Classification;

pub const DEFAULT_IDENTIFIER: &str = "unidentified-target";
pub const DEFAULT_PLATFORM: &str = "unspecified-platform";
pub const DEFAULT_KIND: &str = "generic";

/// Separator inside multi-value fields such as `evidence_list`
pub const MULTI_VALUE_SEPARATOR: char = ';';

static SCHEME_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("scheme regex is valid")
});

/// A target record as it appears in an input file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTarget {
    #[serde(default, alias = "identifier")]
    pub target: Option<String>,

    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<String>,

    #[serde(default, alias = "evidence_list", deserialize_with = "list_or_joined")]
    pub evidence: Vec<String>,

    #[serde(default, deserialize_with = "list_or_joined")]
    pub attachments: Vec<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrJoined {
    List(Vec<String>),
    Joined(String),
}

fn list_or_joined<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ListOrJoined>::deserialize(deserializer)? {
        Some(ListOrJoined::List(items)) => items,
        Some(ListOrJoined::Joined(joined)) => split_multi_value(&joined),
        None => Vec::new(),
    })
}

/// Split a `;`-joined field, trimming entries and dropping empty ones
pub fn split_multi_value(value: &str) -> Vec<String> {
    value
        .split(MULTI_VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Canonical unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub identifier: String,
    pub platform: String,
    pub kind: String,
    pub evidence: Vec<String>,
    pub attachments: Vec<String>,
    pub notes: Option<String>,
}

impl Target {
    /// Fill defaults for anything the raw record left out or blank
    pub fn normalize(raw: RawTarget) -> Self {
        Self {
            identifier: non_blank(raw.target).unwrap_or_else(|| DEFAULT_IDENTIFIER.to_string()),
            platform: non_blank(raw.platform).unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            kind: non_blank(raw.kind).unwrap_or_else(|| DEFAULT_KIND.to_string()),
            evidence: raw.evidence,
            attachments: raw.attachments,
            notes: non_blank(raw.notes),
        }
    }

    /// File-name-safe stem derived from the identifier
    pub fn safe_name(&self) -> String {
        safe_name(&self.identifier)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Strip a leading `scheme://` and replace path separators and colons with `_`
pub fn safe_name(identifier: &str) -> String {
    let stripped = SCHEME_PREFIX.replace(identifier.trim(), "");
    let name: String = stripped
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            other => other,
        })
        .collect();

    if name.is_empty() {
        "target".to_string()
    } else {
        name
    }
}

/// A target after hashing and classification. Built once per pass.
#[derive(Debug, Clone)]
pub struct EnrichedTarget {
    target: Target,
    classification: Classification,
    attachment_hashes: IndexMap<String, Option<String>>,
}

impl EnrichedTarget {
    pub fn new(
        target: Target,
        classification: Classification,
        attachment_hashes: IndexMap<String, Option<String>>,
    ) -> Self {
        Self {
            target,
            classification,
            attachment_hashes,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn attachment_hashes(&self) -> &IndexMap<String, Option<String>> {
        &self.attachment_hashes
    }

    /// Digest recorded for an attachment path, if the file was readable
    pub fn digest_for(&self, path: &str) -> Option<&str> {
        self.attachment_hashes
            .get(path)
            .and_then(|d| d.as_deref())
    }

    /// Attachments in input order paired with their digests
    pub fn attachments(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.target
            .attachments
            .iter()
            .map(move |path| (path.as_str(), self.digest_for(path)))
    }
}
