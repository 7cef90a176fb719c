//! Twill - Multi-stream video wall
//!
//! Entry point for the twill command line: URL classification, an
//! interactive wall session, and the download/upload backend proxy.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use twill::classify::classify;
use twill::cli::{Args, Commands};
use twill::config::Config;
use twill::downloader::{installed_version, DownloaderFactory};
use twill::error::TwillError;
use twill::server::start_server;
use twill::session::Session;
use twill::storage::StorageFactory;
use twill::wall::VideoWall;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load twill.toml from current directory first
            if Path::new("twill.toml").exists() {
                info!("Found twill.toml in current directory, loading...");
                Config::from_file("twill.toml")?
            } else {
                Config::default()
            }
        }
    };
    config.apply_env()?;

    match args.command {
        Commands::Classify { urls } => {
            let mut rejected = 0;
            for url in &urls {
                match classify(url) {
                    Ok(video) => println!(
                        "{:<8} {:<24} {:<5} {}",
                        video.platform.display_name(),
                        video.video_id,
                        if video.is_live { "live" } else { "vod" },
                        url
                    ),
                    Err(e) => {
                        rejected += 1;
                        println!("{:<8} {}", "-", e);
                    }
                }
            }
            if rejected > 0 {
                return Err(TwillError::InvalidUrl(format!(
                    "{} of {} URLs could not be classified",
                    rejected,
                    urls.len()
                ))
                .into());
            }
        }
        Commands::Session { layout } => {
            let layout = layout.map(Into::into).unwrap_or(config.wall.layout);
            info!("Starting session with {} slots", layout.slot_count());

            let mut session = Session::new(VideoWall::new(layout));
            let stdin = std::io::stdin();
            session.run(stdin.lock(), std::io::stdout())?;
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            start_server(config).await?;
        }
        Commands::Download { url, output_dir, upload } => {
            let downloader = DownloaderFactory::create_downloader(config.downloader.clone());
            if !downloader.check_availability().await {
                return Err(TwillError::Downloader(format!(
                    "{} not found; install yt-dlp or set downloader.binary_path",
                    config.downloader.binary_path
                ))
                .into());
            }

            // Fail on missing credentials before spending time on the download
            let store = if upload {
                Some(StorageFactory::create_store(config.storage.clone())?)
            } else {
                None
            };

            let spinner = spinner(format!("Downloading {}", url));
            let result = downloader.download(&url, &output_dir).await;
            spinner.finish_and_clear();
            let path = result?;

            match store {
                Some(store) => {
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "video.mp4".to_string());
                    let stored = store.upload_file(&path, &file_name).await?;
                    tokio::fs::remove_file(&path).await?;
                    println!("{}", stored.url);
                }
                None => println!("{}", path.display()),
            }
        }
        Commands::Upload { file, name } => {
            let store = StorageFactory::create_store(config.storage.clone())?;
            let file_name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .ok_or_else(|| TwillError::FileNotFound(file.display().to_string()))?,
            };

            let spinner = spinner(format!("Uploading {}", file.display()));
            let result = store.upload_file(&file, &file_name).await;
            spinner.finish_and_clear();
            let stored = result?;
            println!("{} ({} bytes)", stored.url, stored.size);
        }
        Commands::CheckYtdlp => {
            let downloader = DownloaderFactory::create_downloader(config.downloader.clone());
            let version = installed_version(downloader.as_ref()).await?;
            println!("yt-dlp {} is installed", version);
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".twill").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "twill.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so command output stays pipeable
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

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

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("twill.log").display()
    );

    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
