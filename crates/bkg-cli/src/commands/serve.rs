//! Web server command.

use std::path::PathBuf;

use anyhow::Result;
use bkg_core::AppConfig;
use bkg_graph::{GraphClient, GraphConfig};
use bkg_web::AppState;
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "3030")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file used with --log
    #[arg(long, default_value = "logs/serve.log")]
    pub log_file: PathBuf,
}

pub async fn execute(args: ServeArgs, config: AppConfig, graph_config: GraphConfig) -> Result<()> {
    // The dashboard still serves with the database down; data endpoints answer 503.
    let client = GraphClient::connect_or_disabled(&graph_config).await;
    let connected = client.is_connected();
    let state = AppState::new(client, graph_config, config);

    println!();
    println!("  {} {}", "BKG".cyan().bold(), "Dashboard".bold());
    println!();
    println!("  {}  http://{}:{}", "Dashboard".green(), args.host, args.port);
    println!("  {}        http://{}:{}/api", "API".green(), args.host, args.port);
    if !connected {
        println!("  {}", "Neo4j unavailable, data endpoints disabled".yellow());
    }
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    bkg_web::run_server(state, &args.host, args.port).await?;

    Ok(())
}
