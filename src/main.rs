mod cli;
mod server;
mod tools;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use memscope::config::MemscopeConfig;

#[derive(Parser)]
#[command(name = "memscope", version, about = "Semantic memory retrieval and analytics service")]
struct Cli {
    /// Config file to use instead of ~/.memscope/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve `POST /{operation}` over HTTP
    Serve,
    /// Start the MCP server (stdio transport)
    Mcp,
    /// Search memories by semantic similarity
    Search {
        query: String,
        /// Maximum number of results
        #[arg(short = 'n', long)]
        n_results: Option<usize>,
    },
    /// Find near-duplicate memories
    Duplicates {
        #[arg(long)]
        collection: Option<String>,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        sample_size: Option<usize>,
    },
    /// Print the similarity graph as JSON
    Graph {
        #[arg(long)]
        collection: Option<String>,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        sample_size: Option<usize>,
    },
    /// Count memories per source
    Sources {
        #[arg(long)]
        collection: Option<String>,
    },
    /// Run the external sync process
    Sync,
    /// Check the vector store and embedding provider
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MemscopeConfig::load_from(path)?,
        None => MemscopeConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC and command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve_http(config).await?,
        Command::Mcp => server::serve_stdio(config).await?,
        Command::Search { query, n_results } => cli::search::search(&config, &query, n_results).await?,
        Command::Duplicates {
            collection,
            threshold,
            sample_size,
        } => cli::duplicates::duplicates(&config, collection, threshold, sample_size).await?,
        Command::Graph {
            collection,
            threshold,
            sample_size,
        } => cli::graph::graph(&config, collection, threshold, sample_size).await?,
        Command::Sources { collection } => cli::stats::sources(&config, collection).await?,
        Command::Sync => cli::sync::sync(&config).await?,
        Command::Doctor => cli::doctor::doctor(&config).await?,
    }

    Ok(())
}
