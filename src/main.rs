//! `fits-metrics` CLI - score FITS predictions against a ground truth.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fits_metrics::{server, Config, Evaluator};

/// Compute PSNR, SNR and log-domain SNR between FITS images.
#[derive(Parser, Debug)]
#[command(name = "fits-metrics")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one prediction file against a ground truth file.
    Compare {
        /// Ground truth FITS file.
        #[arg(value_name = "GROUND_TRUTH")]
        ground_truth: PathBuf,

        /// Prediction FITS file.
        #[arg(value_name = "PREDICTION")]
        prediction: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Serve the upload page and scoring endpoint.
    Serve {
        /// Ground truth FITS file.
        #[arg(long, default_value = "data/ground_truth.fits", value_name = "PATH")]
        ground_truth: PathBuf,

        /// Directory for staging uploads.
        #[arg(long, default_value = "uploads", value_name = "DIR")]
        upload_dir: PathBuf,

        /// Listen address.
        #[arg(long, default_value = "127.0.0.1:5000", value_name = "ADDR")]
        bind: SocketAddr,

        /// Largest accepted upload in MiB.
        #[arg(long, default_value = "64", value_name = "INT")]
        max_upload_mib: usize,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fits_metrics={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(args.command) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Compare {
            ground_truth,
            prediction,
            json,
        } => compare(ground_truth, &prediction, json),
        Command::Serve {
            ground_truth,
            upload_dir,
            bind,
            max_upload_mib,
        } => {
            let config = Config {
                ground_truth,
                upload_dir,
                bind,
                max_upload_bytes: max_upload_mib
                    .checked_mul(1024 * 1024)
                    .context("upload limit is too large")?,
                ..Config::default()
            };
            serve(config)
        }
    }
}

fn compare(ground_truth: PathBuf, prediction: &Path, json: bool) -> Result<()> {
    if !prediction.exists() {
        anyhow::bail!("Prediction file does not exist: {}", prediction.display());
    }

    let config = Config {
        ground_truth,
        ..Config::default()
    };
    let evaluator = Evaluator::new(config).context("Failed to load ground truth")?;

    let report = evaluator
        .evaluate_path(prediction)
        .with_context(|| format!("Failed to score {}", prediction.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File:    {}", report.filename);
        println!("PSNR:    {}", report.psnr);
        println!("SNR:     {}", report.snr);
        println!("LogSNR:  {}", report.logsnr);
    }

    Ok(())
}

fn serve(config: Config) -> Result<()> {
    let evaluator = Evaluator::new(config).context("Failed to initialize evaluator")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(server::serve(Arc::new(evaluator)))
        .context("Server error")?;

    Ok(())
}
