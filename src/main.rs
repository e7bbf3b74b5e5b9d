//! pagesift: structured single-page extraction
//!
//! Fetches a page, renders it headlessly when it looks script-driven, and
//! segments it into typed sections.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagesift::{
    api::HttpServer,
    config::{Config, LogFormat, DEFAULT_CONFIG_FILE},
    scraping::ScrapePipeline,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "pagesift")]
#[command(about = "Structured page extraction with headless exploration")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbosity level (overrides [logging] level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Scrape a single URL and print the result as JSON
    Scrape {
        /// Page to scrape
        url: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Never launch a headless browser
        #[arg(long)]
        no_js: bool,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init must work even when an existing config file is broken
    if let Commands::Init { path } = &cli.command {
        init_logging(&Config::default(), cli.verbose)?;
        return init_config(path);
    }

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    init_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Serve { listen } => serve(config, listen).await,
        Commands::Scrape { url, pretty, no_js } => scrape(config, url, pretty, no_js).await,
        Commands::Init { .. } => Ok(()),
    }
}

fn init_logging(config: &Config, verbose: u8) -> Result<()> {
    let log_level = match verbose {
        0 => config.logging.level.as_tracing_level(),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr so `scrape` output stays machine-readable
    match config.logging.format {
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(log_level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

async fn serve(mut config: Config, listen: Option<String>) -> Result<()> {
    if let Some(listen) = listen {
        config.http.listen_addr = listen;
        config.validate()?;
    }

    let pipeline = Arc::new(ScrapePipeline::from_config(&config)?);
    let server = HttpServer::new(config.http.clone(), pipeline);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            let _ = shutdown_tx.send(());
        }
    });

    server.run(shutdown_rx).await
}

async fn scrape(mut config: Config, url: String, pretty: bool, no_js: bool) -> Result<()> {
    if no_js {
        config.scraping.enable_js_rendering = false;
    }

    let pipeline = ScrapePipeline::from_config(&config)?;
    let result = pipeline
        .scrape(&url)
        .await
        .with_context(|| format!("Failed to scrape {}", url))?;

    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);
    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    let config_path = path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let toml_content = format!(
        "# pagesift configuration\n\n{}",
        Config::default().to_toml()?
    );
    std::fs::write(&config_path, toml_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    Ok(())
}
