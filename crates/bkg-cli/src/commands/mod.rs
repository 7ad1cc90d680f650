//! CLI command definitions and handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bkg_core::AppConfig;
use bkg_graph::{GraphClient, GraphConfig};
use clap::{Parser, Subcommand};

pub mod build;
pub mod query;
pub mod serve;
pub mod show;
pub mod status;

/// London borough knowledge graph
#[derive(Parser)]
#[command(name = "bkg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./bkg.toml when present)
    #[arg(short, long, global = true, env = "BKG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Wipe the database and rebuild the graph from the datasets
    Build(build::BuildArgs),

    /// Show connection details and graph contents
    Status,

    /// Run one of the dashboard queries
    #[command(subcommand)]
    Query(query::QueryCommands),

    /// Print a preset table (boroughs, businesses or relationships)
    Show(show::ShowArgs),

    /// Start the dashboard server
    Serve(serve::ServeArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref()).context("Failed to load configuration")?;
        let graph_config = GraphConfig::from_env();

        match self.command {
            Commands::Build(args) => build::execute(args, &config, &graph_config).await,
            Commands::Status => status::execute(&graph_config).await,
            Commands::Query(cmd) => query::execute(cmd, &graph_config).await,
            Commands::Show(args) => show::execute(args, &graph_config).await,
            Commands::Serve(args) => serve::execute(args, config, graph_config).await,
        }
    }
}

/// Connect or fail with a hint about the environment variables.
pub(crate) async fn connect(config: &GraphConfig) -> Result<GraphClient> {
    GraphClient::connect(config).await.with_context(|| {
        format!(
            "Could not reach Neo4j at {} (set NEO4J_URI, NEO4J_USER, NEO4J_PASSWORD)",
            config.uri
        )
    })
}
