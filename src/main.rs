// Copyright (c) 2024 Nexus. All rights reserved.

use clap::{ArgAction, Parser, Subcommand};
use log::{error, info, warn};
use pdf_jobs::config::{get_config_path, Config};
use pdf_jobs::environment::Region;
use pdf_jobs::manifest::{load_manifests, JobManifest};
use pdf_jobs::{logging, JobHandle, JobRunner, JobStatus, PdfServicesApi, PdfServicesClient};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Path to the config file. Defaults to ./pdf-jobs.json, then ~/.pdf-jobs/config.json.
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Service region. Overrides the config file.
    #[arg(long, global = true, value_enum)]
    region: Option<Region>,

    /// Enable debug logging
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the single job described by a manifest
    Run {
        /// Path to the job manifest (.json)
        #[arg(long, value_name = "FILE_PATH")]
        manifest: PathBuf,

        /// Directory for downloaded outputs
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },
    /// Run every job of a manifest concurrently
    Batch {
        /// Path to the batch manifest (.json)
        #[arg(long, value_name = "FILE_PATH")]
        manifest: PathBuf,

        /// Maximum number of jobs in flight
        #[arg(long, default_value = "4")]
        max_concurrent: usize,

        /// Directory for downloaded outputs
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },
    /// Poll an existing job once and print its state
    Status {
        /// Job location returned at submission
        #[arg(long, value_name = "URL")]
        location: String,
    },
}

fn load_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_path()?,
    };
    let mut config = Config::load_or_default(&path)?;
    config.apply_env();
    if let Some(region) = args.region {
        config.region = region;
        config.base_url.clear();
    }
    if !config.credentials().is_complete() {
        return Err(format!(
            "missing credentials: set client_id and access_token in {} or the PDF_SERVICES_* environment variables",
            path.display()
        )
        .into());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = load_config(&args)?;
    let client_config = config.client_config();
    let client = Arc::new(PdfServicesClient::new(&client_config)?);
    info!("Using {} ({})", client.base_url(), config.region);

    let (shutdown_sender, _) = broadcast::channel(1);
    let shutdown_sender_clone = shutdown_sender.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, stopping");
            let _ = shutdown_sender_clone.send(());
        }
    });

    let runner = JobRunner::new(client.clone(), client_config.poll).with_shutdown(shutdown_sender);

    match args.command {
        Command::Run { manifest, out_dir } => {
            let manifest = JobManifest::load_from_file(&manifest)?;
            runner.run_manifest(&manifest, &out_dir).await.map_err(|e| {
                error!("Job {} failed: {}", manifest.name, e);
                e
            })?;
        }
        Command::Batch { manifest, max_concurrent, out_dir } => {
            let manifests = load_manifests(&manifest)?;
            let outcomes = runner.run_manifests(manifests, max_concurrent, &out_dir).await;

            let total = outcomes.len();
            let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
            info!("{} of {} job(s) succeeded", total - failed, total);
            if failed > 0 {
                return Err(format!("{} of {} job(s) failed", failed, total).into());
            }
        }
        Command::Status { location } => match client.job_status(&JobHandle::new(location.clone())).await? {
            JobStatus::InProgress { retry_after } => {
                println!("{}: in progress (retry after {}s)", location, retry_after.as_secs());
            }
            JobStatus::Succeeded(result) => {
                println!("{}: succeeded", location);
                for (role, asset) in result.outputs() {
                    println!("  {} {} {}", role, asset.asset_id, asset.download_uri.as_deref().unwrap_or("-"));
                }
                if let Some(metadata) = result.metadata() {
                    println!("  metadata {}", metadata);
                }
            }
            JobStatus::Failed(e) => {
                println!("{}: failed: {}", location, e);
            }
        },
    }

    Ok(())
}
