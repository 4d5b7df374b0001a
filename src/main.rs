// src/main.rs
use std::path::PathBuf;
use std::process::exit;
use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Confirm;
use tracing::{error, info, Level};

use openice::{App, AppConfig, CaseId, RawTarget, RunOutcome, RunRequest, Target};

#[derive(Parser)]
#[command(name = "openice")]
#[command(about = "Batch abuse-report generator: evidence JSON, trust & safety letter and issue markdown per target")]
struct Args {
    #[arg(short, long, required_unless_present = "init_config", help = "Input CSV or JSON file with targets")]
    input: Option<PathBuf>,

    #[arg(short, long, help = "Case prefix for folder naming")]
    prefix: Option<String>,

    #[arg(short, long, help = "Output base folder")]
    out: Option<PathBuf>,

    #[arg(long, help = "GitHub personal access token (optional)")]
    github_token: Option<String>,

    #[arg(long, help = "GitHub owner/repo to create issues in")]
    github_repo: Option<String>,

    #[arg(long, help = "Run non-interactive (skip the confirmation prompt)")]
    auto: bool,

    #[arg(long, help = "Create a GitHub issue per target (requires token and repo)")]
    auto_publish: bool,

    #[arg(long, short, help = "Configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Write the effective configuration to the default config path and exit")]
    init_config: bool,

    #[arg(long, requires = "init_config", help = "Overwrite an existing configuration file")]
    force: bool,

    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            exit(1);
        }
    };

    // Command-line flags win over every other layer
    if let Some(prefix) = args.prefix {
        config.case_prefix = prefix;
    }
    if let Some(out) = args.out {
        config.output_root = out;
    }
    if let Some(repo) = args.github_repo {
        config.github.repo = Some(repo);
    }
    if let Some(token) = args.github_token {
        config.github.token = Some(token);
    }

    if args.init_config {
        let path = args.config.unwrap_or_else(AppConfig::default_config_path);
        if let Err(e) = config.save(&path, args.force) {
            error!("{}", e);
            exit(1);
        }
        println!("Configuration initialized at {}", path.display());
        return Ok(());
    }

    let Some(input) = args.input else {
        error!("No input file given");
        exit(1);
    };

    let request = RunRequest {
        input,
        non_interactive: args.auto,
        auto_publish: args.auto_publish,
    };

    let app = App::new(config);
    match app.run(&request, confirm_with_preview).await {
        Ok(RunOutcome::Completed(output)) => {
            info!("All done. Case folder: {}", output.case_dir.display());
        }
        Ok(RunOutcome::NoTargets) | Ok(RunOutcome::Declined { .. }) => {}
        Err(e) => {
            error!("{:#}", e);
            exit(1);
        }
    }

    Ok(())
}

/// Show the first few targets and ask before generating anything
fn confirm_with_preview(case_id: &CaseId, targets: &[RawTarget]) -> Result<bool> {
    println!("\nCase {}: first {} of {} targets", case_id, targets.len().min(3), targets.len());
    for raw in targets.iter().take(3) {
        let target = Target::normalize(raw.clone());
        println!(" - {} | {} | {}", target.identifier, target.platform, target.kind);
    }
    println!();

    Confirm::new()
        .with_prompt("Proceed to generate reports?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}
