// src/app.rs - Run driver tying input, case numbering and the pipeline together
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::case::{CaseAllocator, CaseId, FileCounterStore};
use crate::config::AppConfig;
use crate::input::load_targets;
use crate::pipeline::{CaseOutput, Pipeline};
use crate::publish::{GithubPublisher, IssuePublisher, RepoCoordinates};
use crate::target::RawTarget;
use crate::utils::http::HttpClient;

/// What a single invocation was asked to do
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: PathBuf,
    /// Skip the confirmation gate
    pub non_interactive: bool,
    /// Create remote issues when repo and token are configured
    pub auto_publish: bool,
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Input parsed to zero targets; no case was created
    NoTargets,
    /// The confirmation gate said no. The case id was still consumed.
    Declined { case_id: CaseId },
    Completed(CaseOutput),
}

/// Main application struct
pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load targets, allocate a case, ask for confirmation and process the batch.
    ///
    /// `confirm` is only consulted for interactive runs. It sees the case id
    /// and the raw targets and returns whether to proceed.
    pub async fn run<F>(&self, request: &RunRequest, confirm: F) -> Result<RunOutcome>
    where
        F: FnOnce(&CaseId, &[RawTarget]) -> Result<bool>,
    {
        let targets = load_targets(&request.input).await?;
        if targets.is_empty() {
            info!("No targets loaded. Exiting.");
            return Ok(RunOutcome::NoTargets);
        }

        let allocator = CaseAllocator::new(FileCounterStore::new(self.config.counter_path()));
        let case_id = allocator
            .allocate(&self.config.case_prefix)
            .context("Failed to allocate case id")?;

        info!("Loaded {} targets. Case ID will be: {}", targets.len(), case_id);

        if request.non_interactive {
            info!("Auto mode: proceeding without interactive confirmation.");
        } else if !confirm(&case_id, &targets)? {
            info!("Aborted by user.");
            return Ok(RunOutcome::Declined { case_id });
        }

        let mut pipeline = Pipeline::new(&self.config.output_root);
        if let Some(publisher) = self.publisher(request.auto_publish)? {
            pipeline = pipeline.with_publisher(publisher);
        }

        let output = pipeline
            .process(targets, &case_id)
            .await
            .with_context(|| format!("Case {} aborted", case_id))?;

        Ok(RunOutcome::Completed(output))
    }

    /// Build the issue publisher if publishing was requested and is fully configured
    fn publisher(&self, auto_publish: bool) -> Result<Option<Arc<dyn IssuePublisher>>> {
        if !auto_publish {
            return Ok(None);
        }

        let github = &self.config.github;
        let (Some(repo), Some(token)) = (github.repo.as_deref(), github.token.as_deref()) else {
            warn!("Auto-publish requested but repository or token is missing; skipping issue creation");
            return Ok(None);
        };

        let repo: RepoCoordinates = repo.parse()?;
        let http = HttpClient::new(Some(github.user_agent.clone()), Some(github.timeout_secs))?;
        let publisher = GithubPublisher::new(http, &github.api_base, repo, token.to_string())?;

        info!("Issues will be published to {}", publisher.repo());
        Ok(Some(Arc::new(publisher)))
    }
}
