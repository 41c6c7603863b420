//! cuesync - transcript to speech alignment
//!
//! Aligns a transcript (and an optional translation) with the words recognized
//! in an audio file and writes timed WebVTT or SRT subtitles.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use cuesync::cli::{Args, CacheAction, Commands};
use cuesync::config::{Config, RecognizerImplementation};
use cuesync::recognize::cache::WordCache;
use cuesync::setup::{ModelManager, AVAILABLE_MODELS};
use cuesync::workflow::{AlignRequest, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Align {
            audio,
            transcript,
            translation,
            output,
            dump_debug,
            words,
            recognizer,
        } => {
            recognizer.apply_to(&mut config.recognizer);
            if let Some(words_path) = words {
                config.recognizer.implementation = RecognizerImplementation::WordFile;
                config.recognizer.words_path = Some(words_path);
            }
            prepare_models(&config).await?;

            let workflow = Workflow::new(config)?;
            let request = AlignRequest {
                audio,
                transcript,
                translation,
                output,
                dump_debug,
            };
            let summary = workflow.align(&request).await?;

            if summary.fallbacks > 0 {
                warn!(
                    "{} of {} lines could not be matched and use estimated timings",
                    summary.fallbacks, summary.cues
                );
            }
            println!("Generated {} cues in {}", summary.cues, summary.output.display());
        }
        Commands::Transcribe {
            audio,
            output,
            recognizer,
        } => {
            recognizer.apply_to(&mut config.recognizer);
            prepare_models(&config).await?;

            let workflow = Workflow::new(config)?;
            let count = workflow.transcribe_to_file(&audio, &output).await?;
            println!("Exported {} words to {}", count, output.display());
        }
        Commands::Models { download } => {
            let manager = ModelManager::new(config.recognizer.models_dir.clone())?;

            println!("\nAvailable whisper.cpp Models:");
            println!("{:<15} {:<22} {:<10} {:<10}", "Name", "Filename", "Size (MB)", "Status");
            println!("{}", "-".repeat(60));
            for model in AVAILABLE_MODELS {
                let status = if manager.is_downloaded(model) { "Downloaded" } else { "Missing" };
                println!("{:<15} {:<22} {:<10.1} {:<10}", model.name, model.filename(), model.size_mb, status);
            }

            if download {
                info!("Downloading all missing models...");
                for model in AVAILABLE_MODELS {
                    if !manager.is_downloaded(model) {
                        manager.download_model(model).await?;
                    }
                }
                info!("All models downloaded successfully");
            }
        }
        Commands::Cache { action } => {
            let cache = WordCache::new(config.cache.dir.clone());
            match action {
                CacheAction::Info => {
                    let stats = cache.stats().await?;
                    println!("\nWord Cache ({}):", cache.dir().display());
                    println!("  Entries: {}", stats.total_files);
                    println!("  Size:    {:.2} MB", stats.total_size as f64 / (1024.0 * 1024.0));
                    if let (Some(oldest), Some(newest)) = (stats.oldest_entry, stats.newest_entry) {
                        println!("  Oldest:  {}", oldest.format("%Y-%m-%d %H:%M:%S"));
                        println!("  Newest:  {}", newest.format("%Y-%m-%d %H:%M:%S"));
                    }
                }
                CacheAction::Clear => {
                    let removed = cache.clear().await?;
                    println!("Removed {} cached word streams", removed);
                }
            }
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Fetch the whisper.cpp model up front so recognition does not fail late
async fn prepare_models(config: &Config) -> Result<()> {
    if config.recognizer.implementation == RecognizerImplementation::WhisperCpp {
        let manager = ModelManager::new(config.recognizer.models_dir.clone())?;
        let path = manager.ensure_model(&config.recognizer.model).await?;
        info!("Using whisper.cpp model {}", path.display());
    }
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".cuesync").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation; the guard must outlive the program
    let file_appender = rolling::daily(&log_dir, "cuesync.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
