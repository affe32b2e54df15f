//! CLI module. Command parsing and dispatch; `main.rs` calls `cli::run()`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use orbitdesk::agent::ConversationLoop;
use orbitdesk::auth::{seed_users, UserDirectory};
use orbitdesk::catalog::Catalog;
use orbitdesk::config::Config;
use orbitdesk::gateway::{AppState, ChatRequest};
use orbitdesk::providers::GeminiClient;
use orbitdesk::rag::{KeywordIndex, RagService};
use orbitdesk::session::FileStore;
use orbitdesk::tools::default_registry;

#[derive(Parser)]
#[command(name = "orbitdesk")]
#[command(version)]
#[command(about = "Agentic e-commerce customer support backend", long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults to ~/.orbitdesk/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway (default)
    Serve,
    /// Send a single message and print the reply
    Chat {
        message: String,
        /// Reuse an existing session id
        #[arg(long)]
        session: Option<String>,
    },
    /// Write the demo user accounts to the data directory
    Seed,
}

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orbitdesk=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let state = build_state(&config)?;
            orbitdesk::gateway::serve(state, &config.gateway)
                .await
                .context("gateway failed")?;
        }
        Commands::Chat { message, session } => {
            let state = build_state(&config)?;
            let response = state
                .process(ChatRequest {
                    message,
                    session_id: session,
                })
                .await?;
            println!("{}", response.answer);
            println!(
                "\n[session: {} | intent: {} | route: {} | iterations: {}]",
                response.session_id, response.intent, response.route, response.iterations
            );
        }
        Commands::Seed => {
            let count = seed_users(config.data_path())?;
            if count == 0 {
                println!("users.json already exists, nothing to do");
            } else {
                println!("seeded {count} demo users");
            }
        }
    }

    Ok(())
}

fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let data_dir = config.data_path();

    if config.provider.api_key.is_empty() {
        warn!("no API key configured; set GEMINI_API_KEY or GOOGLE_API_KEY");
    }
    let model = Arc::new(GeminiClient::new(
        &config.provider.api_key,
        &config.provider.model,
        &config.provider.api_base,
    ));

    let catalog = Arc::new(Catalog::load(&data_dir)?);
    let index = Arc::new(KeywordIndex::load(&data_dir)?);
    let rag = Arc::new(RagService::new(index, model.clone()));
    let tools = Arc::new(default_registry(catalog, rag.clone()));
    let store = Arc::new(FileStore::new(config.sessions_path())?);
    let users = Arc::new(UserDirectory::load(&data_dir)?);

    let conversation = ConversationLoop::new(
        &config.agent,
        store.clone(),
        model,
        tools,
        rag,
    );

    Ok(Arc::new(AppState::new(
        conversation,
        store,
        users,
        &config.gateway,
    )))
}
