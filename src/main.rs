mod cli;

use clap::Parser;
use credence::config::{self, ConfigSnapshot, ConfigStore, DEFAULT_CONFIG_FILE};
use credence::consilience::{LinkChecker, NoSource, RepoSource};
use credence::error::CredenceError;
use credence::report::{self, DocsReport, OutputFormat};
use credence::scan::{activity_from_git, LocalRepoSource};
use credence::types::snapshot::{ActivityData, RepoInfo, RepoSnapshot};
use credence::{DocsEffectiveComposer, SustainabilityGate};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit `--config` must exist; otherwise `credence.toml` in the working
/// directory is used when present, else built-in defaults.
fn load_snapshot(explicit: Option<&Path>) -> Result<Arc<ConfigSnapshot>, CredenceError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|path| path.is_file()),
    };
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            Ok(ConfigStore::open(&path)?.snapshot())
        }
        None => Ok(Arc::new(ConfigSnapshot::defaults()?)),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CredenceError> {
    if !path.exists() {
        return Err(CredenceError::PathNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn output_format(format: &cli::ReportFormat) -> OutputFormat {
    match format {
        cli::ReportFormat::Json => OutputFormat::Json,
        cli::ReportFormat::Md => OutputFormat::Md,
    }
}

async fn run() -> Result<i32, CredenceError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        cli::Commands::Docs(cmd) => {
            if !cmd.readme.exists() {
                return Err(CredenceError::PathNotFound(cmd.readme.display().to_string()));
            }
            let readme = std::fs::read_to_string(&cmd.readme)?;
            let snapshot = load_snapshot(cmd.config.as_deref())?;

            let source: Arc<dyn RepoSource> = match (&cmd.repo_dir, &cmd.snapshot) {
                (Some(dir), _) => {
                    if !dir.is_dir() {
                        return Err(CredenceError::PathNotFound(dir.display().to_string()));
                    }
                    Arc::new(LocalRepoSource::new(dir))
                }
                (None, Some(file)) => Arc::new(read_json::<RepoSnapshot>(file)?),
                (None, None) => Arc::new(NoSource),
            };
            let composer = DocsEffectiveComposer::new(Arc::clone(&snapshot)).with_source(source);

            let (result, links) = if cmd.check_links {
                let checker =
                    LinkChecker::http(Arc::clone(&snapshot.patterns), snapshot.config.links.clone())?;
                let (result, links) = composer
                    .compute_with_links(
                        &cmd.owner,
                        &cmd.repo,
                        Some(&readme),
                        cmd.raw,
                        cmd.skip_consilience,
                        &checker,
                    )
                    .await;
                (result, Some(links))
            } else {
                let result = composer.compute(
                    &cmd.owner,
                    &cmd.repo,
                    Some(&readme),
                    cmd.raw,
                    cmd.skip_consilience,
                );
                (result, None)
            };

            let rendered = report::render_docs(
                &DocsReport {
                    result: &result,
                    links: links.as_ref(),
                },
                output_format(&cmd.format),
            )?;
            println!("{rendered}");

            if result.is_marketing_heavy || result.has_broken_refs {
                Ok(exit_code::WARNINGS)
            } else {
                Ok(exit_code::SUCCESS)
            }
        }
        cli::Commands::Gate(cmd) => {
            let snapshot = load_snapshot(cmd.config.as_deref())?;
            let activity: ActivityData = match &cmd.activity {
                Some(file) => read_json(file)?,
                None => activity_from_git(&cmd.repo_dir)?,
            };
            let repo_info = cmd
                .repo_info
                .as_deref()
                .map(read_json::<RepoInfo>)
                .transpose()?;

            let gate = SustainabilityGate::new(snapshot.config.gate.clone());
            let result = gate.check(&activity, repo_info.as_ref());
            let rendered = report::render_gate(&result, output_format(&cmd.format))?;
            println!("{rendered}");

            if result.is_sustainable {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::WARNINGS)
            }
        }
        cli::Commands::ConfigHash(cmd) => {
            let loaded = config::load_config(&cmd.path)?;
            println!("{}", loaded.content_hash);
            Ok(exit_code::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
