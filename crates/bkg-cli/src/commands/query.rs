//! Dashboard queries from the command line.

use anyhow::Result;
use bkg_graph::queries::{self, YearRange};
use bkg_graph::GraphConfig;
use clap::Subcommand;
use colored::Colorize;

use crate::output;

#[derive(Subcommand)]
pub enum QueryCommands {
    /// All boroughs and aggregate regions
    Boroughs,

    /// All business types
    Types,

    /// Years with population figures
    Years,

    /// Years with survival figures
    SurvivalYears,

    /// A borough and its neighbours
    Neighbours {
        borough: String,
    },

    /// Population per borough in one year
    Population {
        #[arg(long = "borough", value_name = "NAME", required = true)]
        boroughs: Vec<String>,
        #[arg(long)]
        year: i64,
    },

    /// Business counts per borough; every borough when none are given
    Counts {
        #[arg(long = "borough", value_name = "NAME")]
        boroughs: Vec<String>,
        #[arg(long = "type")]
        business_type: String,
    },

    /// Population series inside a year range
    Range {
        #[arg(long = "borough", value_name = "NAME", required = true)]
        boroughs: Vec<String>,
        #[arg(long, default_value = "1999")]
        min_year: i64,
        #[arg(long, default_value = "2050")]
        max_year: i64,
    },

    /// Survival rates per borough in one year
    Survival {
        #[arg(long = "borough", value_name = "NAME", required = true)]
        boroughs: Vec<String>,
        #[arg(long)]
        year: i64,
    },

    /// Business count against total population per borough
    Ratio {
        #[arg(long = "type")]
        business_type: String,
    },
}

pub async fn execute(cmd: QueryCommands, graph_config: &GraphConfig) -> Result<()> {
    let client = super::connect(graph_config).await?;

    match cmd {
        QueryCommands::Boroughs => output::print_list("Boroughs", &queries::all_boroughs(&client).await?),
        QueryCommands::Types => {
            output::print_list("Business types", &queries::all_business_types(&client).await?)
        }
        QueryCommands::Years => output::print_list("Population years", &queries::population_years(&client).await?),
        QueryCommands::SurvivalYears => {
            output::print_list("Survival years", &queries::survival_years(&client).await?)
        }
        QueryCommands::Neighbours { borough } => {
            let names = queries::borough_and_neighbours(&client, &borough).await?;
            if names.is_empty() {
                println!("{} {}", "Unknown borough:".yellow(), borough);
            } else {
                output::print_list(&format!("{} and neighbours", borough), &names);
            }
        }
        QueryCommands::Population { boroughs, year } => {
            let pops = queries::population_for_boroughs(&client, &boroughs, year).await?;
            output::print_map(&format!("Population ({})", year), &pops);
        }
        QueryCommands::Counts { boroughs, business_type } => {
            let counts = if boroughs.is_empty() {
                queries::business_count_for_all_boroughs(&client, &business_type).await?
            } else {
                queries::business_count_for_boroughs(&client, &boroughs, &business_type).await?
            };
            output::print_map(&format!("{} businesses", business_type), &counts);
        }
        QueryCommands::Range { boroughs, min_year, max_year } => {
            let range = YearRange { min_year, max_year };
            output::print_population_rows(&queries::population_in_range(&client, &boroughs, range).await?);
        }
        QueryCommands::Survival { boroughs, year } => {
            output::print_survival_rows(&queries::survival_rates_for_boroughs(&client, &boroughs, year).await?);
        }
        QueryCommands::Ratio { business_type } => {
            output::print_ratio_rows(&queries::people_business_ratio(&client, &business_type).await?);
        }
    }

    client.close();
    Ok(())
}
