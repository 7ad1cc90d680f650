//! Connection and content status.

use anyhow::Result;
use bkg_graph::{GraphClient, GraphConfig};
use colored::Colorize;

use crate::output;

pub async fn execute(graph_config: &GraphConfig) -> Result<()> {
    println!("{}", "Knowledge Graph Status".bold());
    println!("{}", "─".repeat(50));
    println!("  {:<12} {}", "URI:", graph_config.uri);
    println!("  {:<12} {}", "Database:", graph_config.database);
    println!("  {:<12} {}", "User:", graph_config.user);

    let client = GraphClient::connect_or_disabled(graph_config).await;
    if !client.is_connected() {
        println!("  {:<12} {}", "Connection:", "unavailable".red());
        return Ok(());
    }
    println!("  {:<12} {}", "Connection:", "ok".green());

    let counts = client.counts().await?;
    println!();
    output::print_counts(&counts);

    client.close();
    Ok(())
}
