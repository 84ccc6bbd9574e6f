//! Archiver: mirrors chat attachments into a remote folder tree.
//!
//! Reads JSON-lines events (see [`archiver_cli::JsonLineEvent`]) from stdin or
//! a file. Configuration comes from the environment and `.env`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use archiver_cli::parse_event_line;
use archiver_core::{Classifier, Config, IdGenerator, RemoteBackend, StagingDirs, UuidIds};
use archiver_infra::{init_telemetry, shutdown_telemetry};
use archiver_processing::FfmpegTranscoder;
use archiver_storage::{create_remote_store, LocalStager};
use archiver_worker::{IngestQueue, Pipeline};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

#[derive(Parser)]
#[command(name = "archiver", about = "Chat attachment archiver")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive attachments from a stream of JSON-lines events
    Run {
        /// Read events from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Use the in-memory remote store; nothing leaves the machine
        #[arg(long)]
        dry_run: bool,
    },
    /// Show where an attachment of the given media type would be archived
    Classify {
        /// Declared media type, e.g. "audio/ogg; codecs=opus"
        media_type: String,
        /// Identifier used in the file name (random when omitted)
        #[arg(long)]
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run {
        input: None,
        dry_run: false,
    }) {
        Commands::Run { input, dry_run } => run(input, dry_run).await,
        Commands::Classify { media_type, id } => classify(&media_type, id),
    }
}

fn classify(media_type: &str, id: Option<String>) -> anyhow::Result<()> {
    let (dirs, root) = match Config::from_env() {
        Ok(config) => (config.staging_dirs, config.root_folder_name),
        Err(_) => (StagingDirs::under("media"), "Archive".to_string()),
    };
    let id = id.unwrap_or_else(|| UuidIds.next_id());

    let result = Classifier::new(dirs, root).classify(media_type, &id);
    let out = serde_json::to_string_pretty(&result).context("Serialize classification")?;
    println!("{}", out);
    Ok(())
}

async fn run(input: Option<PathBuf>, dry_run: bool) -> anyhow::Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if dry_run {
        config.remote_backend = RemoteBackend::Memory;
    }
    config.validate().context("Invalid configuration")?;

    init_telemetry(config.log_format, &config.environment)?;

    tracing::info!(
        channel_id = %config.monitored_channel_id,
        root_folder = %config.root_folder_name,
        backend = %config.remote_backend,
        allow_list = config.access_allow_list.len(),
        "Starting archiver"
    );

    let stager = LocalStager::new();
    stager
        .ensure_directories(&config.staging_dirs.all())
        .await
        .context("Failed to create staging directories")?;

    let store = create_remote_store(&config).context("Failed to create remote store")?;
    let transcoder = Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone()));
    let pipeline = Arc::new(Pipeline::new(&config, store, transcoder).with_stager(stager));
    let queue = IngestQueue::start(pipeline, config.pipeline);

    let reader: Box<dyn AsyncRead + Unpin + Send> = match &input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };
    let mut lines = BufReader::new(reader).lines();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut line_number: u64 = 0;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Interrupt received, finishing queued attachments");
                break;
            }
            next = lines.next_line() => {
                let line = match next {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        tracing::info!("Input closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read input");
                        break;
                    }
                };
                line_number += 1;

                match parse_event_line(&line) {
                    Ok(Some(event)) => {
                        if queue.submit(event).await.is_err() {
                            tracing::error!("Ingest queue closed unexpectedly");
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(line = line_number, error = %e, "Skipping malformed event");
                    }
                }
            }
        }
    }

    let stats = queue.shutdown().await;
    tracing::info!(
        archived = stats.archived,
        ignored = stats.ignored,
        failed = stats.failed,
        "Archiver stopped"
    );
    shutdown_telemetry().await;
    Ok(())
}
