//! Graph build command.

use std::time::Duration;

use anyhow::{Context, Result};
use bkg_core::AppConfig;
use bkg_graph::{build_knowledge_graph, BuildOptions, BuildStage, GraphConfig};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::output;

#[derive(Args)]
pub struct BuildArgs {
    /// Only import these boroughs (repeatable). Overrides import.test_boroughs.
    #[arg(long = "borough", value_name = "NAME")]
    pub boroughs: Vec<String>,
}

pub async fn execute(args: BuildArgs, config: &AppConfig, graph_config: &GraphConfig) -> Result<()> {
    let mut options = BuildOptions::from_config(config);
    if !args.boroughs.is_empty() {
        options = options.with_boroughs(args.boroughs);
    }

    println!("{} {}", "Building knowledge graph on".bold(), graph_config.uri.cyan());
    let scope = options.filter.names();
    if !scope.is_empty() {
        println!("  {} {}", "Boroughs:".dimmed(), scope.join(", "));
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let progress = pb.clone();
    let observer = move |stage: BuildStage| progress.set_message(stage.description());

    let result = build_knowledge_graph(graph_config, &options, Some(&observer)).await;
    pb.finish_and_clear();

    let report = result.context("Knowledge graph build failed")?;
    output::print_build_report(&report);
    Ok(())
}
