mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipgate_core::{
    load_config, AfclipAnalyzer, AfconvertEncoder, ClipVerdict, Config, ConversionScheduler,
    Encoder, OutputPolicy, ProcessingMode, SchedulerEvent, UNATTENDED_MAX_CONCURRENT,
};

/// Converts lossless audio to loudness-normalized AAC and checks the result
/// for digital clipping.
#[derive(Debug, Parser)]
#[command(name = "clipgate", version, about)]
struct Cli {
    /// Audio files or directories to process (wav, aif, aiff, m4a)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Convert to a throwaway temp file and only report clipping
    #[arg(long)]
    analyze_only: bool,

    /// Unattended batch run: wider worker pool
    #[arg(long)]
    batch: bool,

    /// Override the worker-pool size
    #[arg(long)]
    jobs: Option<usize>,

    /// Write outputs into an M4A subfolder next to each source
    #[arg(long)]
    output_folder: bool,

    /// Path to the configuration file
    #[arg(long, env = "CLIPGATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only the reports.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let default_path = PathBuf::from("clipgate.toml");
            if default_path.exists() {
                load_config(&default_path).context("Failed to load clipgate.toml")?
            } else {
                Config::default()
            }
        }
    };

    if cli.batch {
        config.scheduler.max_concurrent = UNATTENDED_MAX_CONCURRENT;
    }
    if let Some(jobs) = cli.jobs {
        config.scheduler.max_concurrent = jobs.max(1);
    }
    if cli.output_folder {
        config.scheduler.output_policy = OutputPolicy::Subfolder;
    }

    Ok(config)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = build_config(&cli)?;

    let encoder = AfconvertEncoder::new(config.encoder.clone());
    let analyzer = AfclipAnalyzer::new(config.analyzer.clone());

    let mode = if cli.analyze_only {
        ProcessingMode::AnalyzeOnly
    } else {
        encoder
            .validate()
            .await
            .context("Encoder is not available")?;
        ProcessingMode::ConvertAndKeep
    };

    let scheduler = ConversionScheduler::new(config.scheduler.clone(), encoder, analyzer);

    let added = scheduler.submit(&cli.paths).await;
    if added == 0 {
        bail!("No audio files found in the given paths");
    }
    info!(
        files = added,
        jobs = config.scheduler.max_concurrent,
        "starting conversion"
    );

    let (tx, mut rx) = mpsc::channel(100);
    if !scheduler.start(mode, Some(tx)).await {
        bail!("Scheduler refused to start");
    }

    let mut clipped = 0usize;
    let mut unknown = 0usize;
    let mut failed = 0usize;

    while let Some(event) = rx.recv().await {
        match event {
            SchedulerEvent::ItemStarted { name, .. } => info!(item = %name, "processing"),
            SchedulerEvent::ItemProgress { .. } => {}
            SchedulerEvent::ItemCompleted { name, report, .. } => match report {
                Some(report) => {
                    match report.verdict() {
                        ClipVerdict::Clipped => clipped += 1,
                        ClipVerdict::Unknown => unknown += 1,
                        ClipVerdict::Clean => {}
                    }
                    print!("{}", report::render(&report));
                }
                None => {
                    warn!(item = %name, "analysis unavailable, converted without a clip report");
                }
            },
            SchedulerEvent::ItemFailed { name, error, .. } => {
                failed += 1;
                error!(item = %name, %error, "conversion failed");
            }
            SchedulerEvent::BatchFinished { completed, failed: batch_failed } => {
                info!(completed, failed = batch_failed, "batch finished");
                break;
            }
        }
    }

    if unknown > 0 {
        warn!(
            files = unknown,
            "clip analysis was inconclusive for some files; do not treat them as verified clean"
        );
    }

    // Scriptable exit status: failures beat clip findings.
    if failed > 0 {
        Ok(ExitCode::from(1))
    } else if clipped > 0 {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
