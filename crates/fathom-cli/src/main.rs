use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::FathomConfig;
use fathom_core::{
    Agent, AgentLookup, AgentPlanner, AgentWriter, CardSender, OpenAiProvider, ResearchManager,
    SEARCH_INSTRUCTIONS, WRITER_INSTRUCTIONS, planner_instructions,
};
use fathom_feishu::{FeishuCardSender, FeishuClient};

#[derive(Parser)]
#[command(name = "fathom")]
#[command(version)]
#[command(about = "Fathom — deep research delivered as Feishu cards")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the research pipeline for a topic
    Research {
        /// The topic to research
        topic: Vec<String>,
    },

    /// Initialize config directory and default config
    Init,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config),
        Commands::Research { topic } => cmd_research(&cli.config, &topic.join(" ")).await,
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        let default_config = include_str!("../../../config/default.toml");
        tokio::fs::write(&config_path, default_config).await?;

        // The file will hold secrets; keep it private
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&config_path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!("Created default config at {}", config_path.display());
    }

    println!("Fathom initialized at {}", config_dir.display());
    println!(
        "Edit {} to configure your API key and Feishu app.",
        config_path.display()
    );
    Ok(())
}

fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let config = FathomConfig::load(config_path)?;
    println!("{:#?}", config);
    Ok(())
}

async fn cmd_research(config_path: &Option<PathBuf>, topic: &str) -> Result<()> {
    if topic.trim().is_empty() {
        return Err(anyhow!("Please provide a research topic"));
    }

    let config = FathomConfig::load(config_path)?;
    if config.provider.api_key.is_empty() {
        return Err(anyhow!(
            "No provider API key configured. Set OPENAI_API_KEY or edit the config."
        ));
    }

    let provider: Arc<OpenAiProvider> = Arc::new(OpenAiProvider::new(
        config.provider.api_key.clone(),
        config.provider.model.clone(),
        config.provider.base_url.clone(),
        config.provider.max_tokens,
    ));

    let planner = AgentPlanner::new(Agent::new(
        "PlannerAgent",
        planner_instructions(config.research.how_many_searches),
        provider.clone(),
    ));
    let lookup = AgentLookup::new(Agent::new(
        "SearchAgent",
        SEARCH_INSTRUCTIONS,
        provider.clone(),
    ));
    let writer = AgentWriter::new(Agent::new(
        "WriterAgent",
        WRITER_INSTRUCTIONS,
        provider.clone(),
    ));

    let sender: Option<Arc<dyn CardSender>> = if config.feishu.enabled {
        let client = FeishuClient::new(
            config.feishu.app_id.clone(),
            config.feishu.app_secret.clone(),
            config.feishu.open_id.clone(),
        )?;
        Some(Arc::new(FeishuCardSender::new(client, topic)))
    } else {
        info!("Feishu delivery disabled; the report will only be printed");
        None
    };

    let manager = ResearchManager::new(
        Arc::new(planner),
        Arc::new(lookup),
        Arc::new(writer),
        sender,
    );

    let (status_tx, mut status_rx) = mpsc::channel(64);
    let printer = tokio::spawn(async move {
        while let Some(update) = status_rx.recv().await {
            println!("{}", update);
        }
    });

    let report = tokio::select! {
        result = manager.run(topic, status_tx) => result?,
        _ = signal::ctrl_c() => {
            info!("Interrupted, aborting research run");
            return Ok(());
        }
    };

    // status_tx is dropped once the run returns, so the printer drains and exits
    let _ = printer.await;

    println!("\n{}", report.markdown_report);
    Ok(())
}
