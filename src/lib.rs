pub mod app;
pub mod case;
pub mod classify;
pub mod config;
pub mod error;
pub mod hash;
pub mod input;
pub mod pipeline;
pub mod publish;
pub mod reporting;
pub mod target;
pub mod utils;

// Re-export main types for easier access
pub use app::{App, RunOutcome, RunRequest};
pub use case::{CaseAllocator, CaseId, CounterStore, FileCounterStore, MemoryCounterStore};
pub use classify::{classify, Category, Classification};
pub use config::AppConfig;
pub use error::{PublishError, ReportError, ReportResult};
pub use pipeline::{CaseOutput, Pipeline};
pub use publish::{GithubPublisher, IssuePublisher, PublishedIssue, RepoCoordinates};
pub use target::{EnrichedTarget, RawTarget, Target};
