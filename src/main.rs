use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use pathwise::completion::{DetectorOutcome, provider::create_provider, respond};
use pathwise::config::ConfigLoader;
use pathwise::types::{Conversation, Result};

#[derive(Parser)]
#[command(name = "pathwise")]
#[command(
    version,
    about = "AI career mentor backend with cascading completion-provider fallback"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one completion turn over a conversation
    Chat {
        /// Conversation JSON file ({"messages": [{"role", "content"}, ...]});
        /// reads stdin when omitted
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Check every configured tier's provider health
    Doctor,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init {
        #[arg(long, help = "Write the global config instead of the project one")]
        global: bool,
        #[arg(long, short, help = "Overwrite an existing config file")]
        force: bool,
    },
    /// Print the effective configuration
    Show {
        #[arg(long, help = "Print as JSON instead of TOML")]
        json: bool,
    },
    /// Print configuration file paths
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(&cli);

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("{} failed to start runtime: {}", style("error:").red().bold(), err);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", style("error:").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "pathwise=debug"
    } else if cli.quiet {
        "pathwise=error"
    } else {
        "pathwise=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Chat { input } => chat(input).await,
        Commands::Doctor => doctor().await,
        Commands::Config { action } => match action {
            ConfigAction::Init { global, force } => {
                let path = if global {
                    ConfigLoader::init_global(force)?
                } else {
                    ConfigLoader::init_project(force)?
                };
                println!("Initialized: {}", path.display());
                Ok(())
            }
            ConfigAction::Show { json } => ConfigLoader::show_config(json),
            ConfigAction::Path => {
                ConfigLoader::show_path();
                Ok(())
            }
        },
    }
}

async fn chat(input: Option<PathBuf>) -> Result<()> {
    let config = ConfigLoader::load()?;

    let raw = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    let conversation: Conversation = serde_json::from_str(&raw)?;

    let response = respond(&config, &conversation).await?;

    match response.outcome {
        DetectorOutcome::Continuing { reply } => {
            println!("{}", reply);
        }
        DetectorOutcome::Completed { report } => {
            println!(
                "{}",
                style("Conversation complete - career report:").green().bold()
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    eprintln!(
        "{}",
        style(format!(
            "[served by {} / {}]",
            response.provider_used, response.model_used
        ))
        .dim()
    );

    Ok(())
}

async fn doctor() -> Result<()> {
    let config = ConfigLoader::load()?;

    let mut any_healthy = false;

    println!("Checking {} tiers:", config.tiers.len());
    println!();

    for tier in &config.tiers {
        let status = match create_provider(tier) {
            Ok(provider) => match provider.health_check().await {
                Ok(true) => {
                    any_healthy = true;
                    format!("{}", style("✓ healthy").green())
                }
                Ok(false) => format!("{}", style("✗ unreachable").red()),
                Err(err) => format!("{} {}", style("✗").red(), err),
            },
            Err(err) => format!("{} {}", style("✗").red(), err),
        };

        println!(
            "  {:<10} {:<10} {}  [{}]",
            tier.name,
            tier.provider,
            status,
            tier.models.join(", ")
        );
    }

    println!();
    if any_healthy {
        println!("{}", style("At least one tier is ready.").green());
        Ok(())
    } else {
        Err(pathwise::PathwiseError::config(
            "No completion tier is healthy".to_string(),
        ))
    }
}
