#![deny(unsafe_code)]

//! Codelore CLI — serve the API or run one-off analyses.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use codelore_core::analyze::AnalyzeRequest;

/// Codelore — AI-powered code context and history analysis.
#[derive(Parser)]
#[command(name = "codelore", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "codelore.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    Serve,

    /// Probe all LLM providers and report availability.
    Probe,

    /// Analyze a single file and print the result as JSON.
    Analyze {
        /// File to analyze.
        file: PathBuf,

        /// Repository root (defaults to the file's directory).
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Provider override ("hosted", "ollama", "localai").
        #[arg(long)]
        provider: Option<String>,

        /// Model override.
        #[arg(long)]
        model: Option<String>,

        /// Commit cap override (1..=100).
        #[arg(long)]
        commits: Option<usize>,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing subscriber with verbosity level
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Serve => cmd_serve(&cli.config).await?,
        Commands::Probe => cmd_probe(&cli.config).await?,
        Commands::Analyze {
            file,
            repo,
            provider,
            model,
            commits,
        } => cmd_analyze(&cli.config, file, repo, provider, model, commits).await?,
        Commands::Config { show } => cmd_config(&cli.config, show).await?,
    }

    Ok(())
}

async fn cmd_serve(config_path: &Path) -> Result<()> {
    let config = load_config(config_path).await?;
    info!(
        addr = %config.server.listen_addr,
        port = config.server.listen_port,
        "starting Codelore API server"
    );
    codelore_core::api::serve(config).await?;
    Ok(())
}

async fn cmd_probe(config_path: &Path) -> Result<()> {
    let config = load_config(config_path).await?;
    let available = codelore_core::llm::available_providers(&config.llm).await;

    println!("Provider availability:");
    for (name, ok) in &available {
        println!("  {name}: {}", if *ok { "available" } else { "not available" });
    }
    if !available.values().any(|ok| *ok) {
        println!("\nNo providers are reachable. To get started:");
        println!("  hosted:  set llm.api_key in {}", config_path.display());
        println!("  ollama:  ollama serve && ollama pull llama3");
        println!("  localai: docker run -p 8080:8080 localai/localai");
    }
    Ok(())
}

async fn cmd_analyze(
    config_path: &Path,
    file: PathBuf,
    repo: Option<PathBuf>,
    provider: Option<String>,
    model: Option<String>,
    commits: Option<usize>,
) -> Result<()> {
    let config = load_config(config_path).await?;

    let request = AnalyzeRequest {
        repo_path: repo.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default(),
        file_path: file.to_string_lossy().into_owned(),
        selected_code: None,
        commit_limit: commits,
        provider,
        model,
    };

    let result = codelore_core::analyze_file(&config, &request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_config(config_path: &Path, show: bool) -> Result<()> {
    let config = load_config(config_path).await?;
    if show {
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

async fn load_config(path: &Path) -> Result<codelore_config::AppConfig> {
    if path.exists() {
        codelore_config::AppConfig::load(path)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    } else {
        info!(path = %path.display(), "config file not found, using defaults");
        Ok(codelore_config::AppConfig::default())
    }
}
