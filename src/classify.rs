// src/classify.rs - Keyword scoring of evidence text
use std::fmt;
use serde::{Serialize, Serializer};

/// Content-risk categories, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sexual,
    Malware,
    Spam,
    Scam,
    Impersonation,
}

impl Category {
    /// All categories in declaration order. Earlier entries win ties.
    pub const ALL: [Category; 5] = [
        Category::Sexual,
        Category::Malware,
        Category::Spam,
        Category::Scam,
        Category::Impersonation,
    ];

    /// Lowercase keywords matched as plain substrings
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Sexual => &["porn", "nsfw", "sex", "nude", "sexual", "explicit"],
            Category::Malware => &[".apk", "malware", "trojan", "virus", "payload", "exploit"],
            Category::Spam => &["spam", "join my channel", "buy now", "advert", "promotion"],
            Category::Scam => &["scam", "fraud", "investment", "earn money", "get rich"],
            Category::Impersonation => &["impostor", "impersonat", "fake profile", "clone"],
        }
    }

    /// Label written into reports
    pub fn label(self) -> &'static str {
        match self {
            Category::Sexual => "sexual_content",
            Category::Malware => "malware_distribution",
            Category::Spam => "spam_promotion",
            Category::Scam => "scam_fraud",
            Category::Impersonation => "impersonation",
        }
    }

    /// Number of distinct keywords of this category present in `text`
    fn score(self, text: &str) -> usize {
        self.keywords().iter().filter(|kw| text.contains(*kw)).count()
    }
}

/// Outcome of classifying a target's evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Matched(Category),
    Unknown,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::Matched(category) => category.label(),
            Classification::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Classify evidence strings by keyword score.
///
/// The strings are joined and lowercased, each category scores one point per
/// distinct keyword found, and the highest score wins. A zero score is `Unknown`.
pub fn classify<S: AsRef<str>>(evidence: &[S]) -> Classification {
    let text = evidence
        .iter()
        .map(|e| e.as_ref())
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase();

    let mut best: Option<(Category, usize)> = None;
    for category in Category::ALL {
        let score = category.score(&text);
        // Strictly greater keeps the earliest category on ties
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((category, score));
        }
    }

    match best {
        Some((category, _)) => Classification::Matched(category),
        None => Classification::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keywords_is_unknown() {
        assert_eq!(classify(&["a perfectly normal cooking channel"]), Classification::Unknown);
        assert_eq!(classify::<&str>(&[]), Classification::Unknown);
        assert_eq!(classify(&["anything"]).label(), "unknown");
    }

    #[test]
    fn test_single_category() {
        assert_eq!(
            classify(&["https://t.me/x/1", "distributes a TROJAN payload as .apk"]),
            Classification::Matched(Category::Malware)
        );
        assert_eq!(classify(&["Fake Profile of a celebrity"]).label(), "impersonation");
        assert_eq!(classify(&["get rich with this investment"]).label(), "scam_fraud");
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        // "spam" three times is still one point; two distinct sexual keywords win
        let evidence = ["spam spam spam", "nude and explicit"];
        assert_eq!(classify(&evidence), Classification::Matched(Category::Sexual));
    }

    #[test]
    fn test_tie_prefers_declaration_order() {
        assert_eq!(classify(&["porn", "malware"]), Classification::Matched(Category::Sexual));
        assert_eq!(classify(&["clone", "buy now"]), Classification::Matched(Category::Spam));
    }

    #[test]
    fn test_keywords_span_joined_evidence() {
        // Entries are joined with a space so "join my" + "channel" forms the phrase
        assert_eq!(classify(&["join my", "channel"]).label(), "spam_promotion");
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&Classification::Matched(Category::Sexual)).unwrap();
        assert_eq!(json, "\"sexual_content\"");
        assert_eq!(serde_json::to_string(&Classification::Unknown).unwrap(), "\"unknown\"");
    }
}
