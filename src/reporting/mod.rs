//! Report artifacts built from one enriched target.
//!
//! Builders are pure: hashing and classification happen earlier in the
//! pipeline and the results are only read here.
mod format;
mod model;
pub mod markdown;
pub mod narrative;

pub use format::ArtifactKind;
pub use model::{
    timestamp, AttachmentDigest, CaseSummary, EvidenceRecord, FailedTarget, GeneratedReport,
    TargetResult,
};
