//! Terminal output formatting.

use std::collections::BTreeMap;
use std::fmt::Display;

use bkg_core::metrics::people_per_business;
use bkg_core::model::{BoroughPopulation, BusinessPopulation, SurvivalRates};
use bkg_graph::{BuildReport, GraphCounts, Record};
use colored::Colorize;
use serde_json::Value;

pub fn print_list<T: Display>(title: &str, items: &[T]) {
    println!("{} {}", title.bold(), format!("({})", items.len()).dimmed());
    println!("{}", "─".repeat(50));
    if items.is_empty() {
        println!("{}", "No results.".dimmed());
    }
    for item in items {
        println!("  {}", item);
    }
}

pub fn print_map(title: &str, values: &BTreeMap<String, i64>) {
    println!("{}", title.bold());
    println!("{}", "─".repeat(50));
    if values.is_empty() {
        println!("{}", "No results.".dimmed());
    }
    for (name, value) in values {
        println!("  {:<30} {:>12}", truncate(name, 30), value);
    }
}

pub fn print_population_rows(rows: &[BoroughPopulation]) {
    if rows.is_empty() {
        println!("{}", "No population records in range.".dimmed());
        return;
    }
    println!("{:<30} {:<6} {:>12}", "Borough", "Year", "Population");
    println!("{}", "─".repeat(50));
    for row in rows {
        println!("{:<30} {:<6} {:>12}", truncate(&row.borough, 30), row.year, row.population);
    }
}

fn rate(v: Option<f64>) -> String {
    v.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "-".to_string())
}

pub fn print_survival_rows(rows: &[SurvivalRates]) {
    if rows.is_empty() {
        println!("{}", "No survival records.".dimmed());
        return;
    }
    println!(
        "{:<24} {:>8} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "Borough", "Births", "1y", "2y", "3y", "4y", "5y"
    );
    println!("{}", "─".repeat(70));
    for row in rows {
        println!(
            "{:<24} {:>8} {:>6} {:>6} {:>6} {:>6} {:>6}",
            truncate(&row.borough, 24),
            row.businesses_started.map(|b| b.to_string()).unwrap_or_else(|| "-".to_string()),
            rate(row.one_year_rate),
            rate(row.two_year_rate),
            rate(row.three_year_rate),
            rate(row.four_year_rate),
            rate(row.five_year_rate),
        );
    }
}

pub fn print_ratio_rows(rows: &[BusinessPopulation]) {
    if rows.is_empty() {
        println!("{}", "No results.".dimmed());
        return;
    }
    println!(
        "{:<30} {:>10} {:>12} {:>14}",
        "Borough", "Businesses", "Population", "People/business"
    );
    println!("{}", "─".repeat(70));
    for row in rows {
        println!(
            "{:<30} {:>10} {:>12} {:>14.1}",
            truncate(&row.borough, 30),
            row.business_count,
            row.population,
            people_per_business(row.population, row.business_count)
        );
    }
}

pub fn print_counts(counts: &GraphCounts) {
    println!("  {:<16} {}", "Nodes:".bold(), counts.nodes);
    println!("  {:<16} {}", "Relationships:".bold(), counts.relationships);
    for (label, n) in &counts.labels {
        println!("    {:<14} {}", label.cyan(), n);
    }
}

/// Print rows with the union of their keys as columns.
pub fn print_records(rows: &[Record]) {
    if rows.is_empty() {
        println!("{}", "No rows.".dimmed());
        return;
    }
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let header: Vec<String> = columns.iter().map(|c| format!("{:<24}", truncate(c, 24))).collect();
    println!("{}", header.join(" ").bold());
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| format!("{:<24}", truncate(&cell(row.get(*c)), 24)))
            .collect();
        println!("{}", cells.join(" "));
    }
    println!("\n{} rows", rows.len().to_string().bold());
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn print_build_report(report: &BuildReport) {
    println!("{}", "Build complete:".green().bold());
    for stage in &report.stages {
        let s = &stage.summary;
        println!(
            "  {:<22} {:>8} kept {:>8} written {:>6} skipped {:>7} ms",
            stage.stage.to_string(),
            s.rows_kept,
            s.rows_submitted,
            s.rows_skipped,
            stage.elapsed_ms
        );
    }
    println!("  {} {:.1}s", "Total:".bold(), report.elapsed.as_secs_f64());
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
