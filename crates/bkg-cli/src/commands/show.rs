//! Preset tables.

use anyhow::{anyhow, Result};
use bkg_graph::queries::{preset_table, TablePreset};
use bkg_graph::GraphConfig;
use clap::Args;
use colored::Colorize;

use crate::output;

#[derive(Args)]
pub struct ShowArgs {
    /// boroughs, businesses or relationships
    pub table: String,
}

pub async fn execute(args: ShowArgs, graph_config: &GraphConfig) -> Result<()> {
    let preset: TablePreset = args.table.parse().map_err(|e: String| anyhow!(e))?;
    let client = super::connect(graph_config).await?;

    let rows = preset_table(&client, preset).await?;
    println!("{} {}", "Table:".bold(), preset.to_string().cyan());
    println!("{}", "─".repeat(50));
    output::print_records(&rows);

    client.close();
    Ok(())
}
