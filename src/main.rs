use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use vk_purge_lib::application::{DeletionRun, RunPlan, WriterSink};
use vk_purge_lib::infrastructure::{
    AppConfig, ConfigManager, HtmlListingExtractor, VkApiClient, init_logging_with_config,
    log_system_info,
};

/// Delete your own VK comments and likes listed in a VK data export
#[derive(Parser, Debug)]
#[command(name = "vk-purge", version, about)]
struct Cli {
    /// VK API access token
    #[arg(
        long,
        env = "VK_ACCESS_TOKEN",
        hide_env_values = true,
        required_unless_present = "save_config"
    )]
    token: Option<String>,

    /// Directory with the exported comment pages
    #[arg(long, value_name = "DIR")]
    comments_path: Option<PathBuf>,

    /// Directory with the exported like pages
    #[arg(long, value_name = "DIR")]
    likes_path: Option<PathBuf>,

    /// Pause between batches in seconds [default: 1.0]
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Random pause between batches, replaces --timeout (e.g. --random-timeout 2 4)
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    random_timeout: Option<Vec<f64>>,

    /// Delete calls in flight per batch [default: 1]
    #[arg(long, value_name = "N")]
    max_tasks: Option<usize>,

    /// Configuration file [default: <config dir>/vk-purge/config.json]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "info,vk_purge_lib=trace"
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Write the effective settings (file plus flags) to the configuration file and exit
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(max_tasks) = self.max_tasks {
            config.batch.max_tasks = max_tasks;
        }
        if let Some(timeout) = self.timeout {
            config.batch.timeout_seconds = timeout;
            config.batch.random_timeout = None;
        }
        if let Some([min, max]) = self.random_timeout.as_deref() {
            config.batch.random_timeout = Some([*min, *max]);
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let manager = match &cli.config {
        Some(path) => Some(ConfigManager::with_path(path)),
        None => ConfigManager::new().ok(),
    };
    // Logging is not up yet; remember what to report once it is
    let (mut config, config_problem) = match &manager {
        Some(manager) => match manager.try_load_config().await {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(e) => (AppConfig::default(), Some(format!("{e:#}"))),
        },
        None => (AppConfig::default(), Some("no user config directory".to_string())),
    };
    cli.apply_overrides(&mut config);

    init_logging_with_config(&config.logging)?;
    log_system_info();
    match (&config_problem, &manager) {
        (Some(problem), _) => warn!("{}; using defaults", problem),
        (None, Some(manager)) => info!("Configuration file: {}", manager.config_path().display()),
        (None, None) => {}
    }

    if cli.save_config {
        let path = save_effective_config(manager.as_ref(), &config).await?;
        info!("Settings written to {}", path.display());
        return Ok(());
    }

    // Everything is validated before the first network call
    let plan = RunPlan::from_paths(cli.comments_path.clone(), cli.likes_path.clone())?;
    let batch = config.batch.to_batch_configuration()?;
    let client = VkApiClient::new(&config.api, cli.token.as_deref().unwrap_or_default())?;
    let extractor =
        HtmlListingExtractor::with_selectors(&config.export.selectors, config.export.encoding)?;

    let cancellation = CancellationToken::new();
    spawn_interrupt_listener(cancellation.clone());

    let run = DeletionRun::new(
        plan,
        batch,
        Arc::new(extractor),
        Arc::new(client),
        Arc::new(WriterSink::stdout()),
    )?
    .with_cancellation(cancellation);
    let report = run.execute().await;

    if report.dispatch.cancelled {
        info!(
            "Interrupted after {}/{} references",
            report.total.completed, report.total.expected
        );
    } else {
        info!(
            "Done: {} delete calls in {} batches, {} unrecognised references, {} exports skipped",
            report.dispatch.attempted,
            report.dispatch.batches,
            report.dispatch.unparseable,
            report.skipped.len()
        );
    }
    Ok(())
}

/// Validated before writing, so a saved file always loads into a runnable configuration.
async fn save_effective_config(manager: Option<&ConfigManager>, config: &AppConfig) -> Result<PathBuf> {
    config.batch.to_batch_configuration()?;
    let manager =
        manager.ok_or_else(|| anyhow::anyhow!("no user config directory; pass --config <FILE>"))?;
    manager.save_config(config).await?;
    Ok(manager.config_path().to_path_buf())
}

/// Ctrl-C stops submission; calls already in flight are awaited.
fn spawn_interrupt_listener(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, finishing the current batch");
                token.cancel();
            }
            Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });
}
