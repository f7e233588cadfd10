use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use watchfinder_catalog::{DocumentSource, JsonCatalogSource};
use watchfinder_common::{logger, AppConfig};
use watchfinder_server::AppState;
use watchfinder_vector::{RetrievalService, ServiceOptions};

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        // Fallback to default dotenv behavior
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "watchfinder")]
#[command(about = "WatchFinder - semantic search over a watch catalog", long_about = None)]
struct Cli {
    /// Catalog JSON file (overrides CATALOG_PATH)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Answer one query and exit
    Ask {
        /// Free-text query
        query: String,

        /// Number of results
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Build the index and print its statistics
    Index,
}

async fn build_service(config: &AppConfig, source: &dyn DocumentSource) -> Result<RetrievalService> {
    let model = watchfinder_embed::embedder_from_config(config)?;
    let service = RetrievalService::new(model, source, ServiceOptions::from_config(config))
        .await
        .context("Failed to build retrieval index")?;
    Ok(service)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env at project root before
    // AppConfig::from_env() reads them
    load_dotenv_from_project_root();

    // CLI --catalog overrides CATALOG_PATH
    let mut config = AppConfig::from_env()?;
    if let Some(catalog) = cli.catalog {
        config.catalog_path = catalog;
    }

    // Handle commands (serve when none given)
    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            // Override with CLI arguments
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            config.validate()?;

            // Initialize logging
            logger::setup_logging(&config.log_dir, &config.log_level)?;

            tracing::info!("WatchFinder starting...");
            tracing::info!("  Catalog: {}", config.catalog_path.display());
            tracing::info!("  Embedding: {:?} ({})", config.embedding_backend, config.embedding_model);
            tracing::info!("  Bind: {}", config.server_bind_address());

            // Load catalog and build the initial index
            let source: Arc<dyn DocumentSource> =
                Arc::new(JsonCatalogSource::new(config.catalog_path.clone()));
            let service = build_service(&config, source.as_ref()).await?;

            println!("Server listening on http://{}", config.server_bind_address());

            // Start server
            let state = Arc::new(AppState::new(config, Arc::new(service), source));
            watchfinder_server::start_server(state).await?;
        }
        Commands::Ask { query, top_k } => {
            config.validate()?;
            logger::setup_console_logging(&config.log_level)?;

            let source = JsonCatalogSource::new(config.catalog_path.clone());
            let service = build_service(&config, &source).await?;
            let top_k = top_k.unwrap_or(config.top_k);

            let results = service.ask(&query, top_k).await?;
            if results.is_empty() {
                println!("No matching documents.");
            }
            for (rank, result) in results.iter().enumerate() {
                println!(
                    "{:>2}. [id {}] {:.4}  {}",
                    rank + 1,
                    result.id,
                    result.score,
                    result.text
                );
            }
        }
        Commands::Index => {
            config.validate()?;
            logger::setup_console_logging(&config.log_level)?;

            let source = JsonCatalogSource::new(config.catalog_path.clone());
            let service = build_service(&config, &source).await?;
            let stats = service.stats().await;

            println!("Catalog:    {}", source.path().display());
            println!("Model:      {}", service.model_name());
            println!("Documents:  {}", stats.documents);
            println!("Indexed:    {}", stats.indexed);
            println!("Degenerate: {}", stats.degenerate);
            println!("Dimension:  {}", stats.dimension);
        }
    }

    Ok(())
}
