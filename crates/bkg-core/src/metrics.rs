//! Derived per-borough metrics.
//!
//! Pure functions over query-layer outputs. Lookups use maps keyed by
//! borough name; a missing key means zero.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::model::{BoroughDensity, BoroughPopulation};

/// Ratios are expressed per this many residents.
pub const PER_RESIDENTS: f64 = 10_000.0;

/// Which way round a density ratio is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    /// Businesses per 10,000 residents.
    #[default]
    BusinessesPer10k,
    /// Residents per business.
    PeoplePerBusiness,
}

/// Businesses per 10,000 residents; 0 when population is unknown.
pub fn businesses_per_10k(business_count: i64, population: i64) -> f64 {
    if population <= 0 {
        return 0.0;
    }
    business_count as f64 / population as f64 * PER_RESIDENTS
}

/// Residents per business; 0 when there are no businesses.
pub fn people_per_business(population: i64, business_count: i64) -> f64 {
    if business_count <= 0 {
        return 0.0;
    }
    population as f64 / business_count as f64
}

/// Combine population and business counts into density rows, in the order
/// of `boroughs`.
pub fn density_rows(
    boroughs: &[String],
    populations: &BTreeMap<String, i64>,
    business_counts: &BTreeMap<String, i64>,
    kind: RatioKind,
) -> Vec<BoroughDensity> {
    boroughs
        .iter()
        .map(|borough| {
            let population = populations.get(borough).copied().unwrap_or(0);
            let business_count = business_counts.get(borough).copied().unwrap_or(0);
            let ratio = match kind {
                RatioKind::BusinessesPer10k => businesses_per_10k(business_count, population),
                RatioKind::PeoplePerBusiness => people_per_business(population, business_count),
            };
            BoroughDensity {
                borough: borough.clone(),
                population,
                business_count,
                business_to_population_ratio: ratio,
            }
        })
        .collect()
}

/// Map-ready ratio per borough, rounded to three decimals.
///
/// Boroughs with no population or no matching businesses get `None` so
/// the map leaves them blank instead of painting a misleading zero.
pub fn map_ratios(
    boroughs: &[String],
    populations: &BTreeMap<String, i64>,
    business_counts: &BTreeMap<String, i64>,
) -> BTreeMap<String, Option<f64>> {
    boroughs
        .iter()
        .map(|borough| {
            let population = populations.get(borough).copied().unwrap_or(0);
            let count = business_counts.get(borough).copied().unwrap_or(0);
            let value = (population > 0 && count > 0)
                .then(|| round3(businesses_per_10k(count, population)));
            (borough.clone(), value)
        })
        .collect()
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Percentage change from `from` to `to`. `None` when `from` is zero.
pub fn percentage_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0)
}

/// Start, middle and end years for past and projected growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthYears {
    pub start: i64,
    pub middle: i64,
    pub end: i64,
}

impl GrowthYears {
    pub fn new(start: i64, middle: i64, end: i64) -> CoreResult<Self> {
        if !(start < middle && middle < end) {
            return Err(CoreError::config(format!(
                "growth years must be increasing, got {}, {}, {}",
                start, middle, end
            )));
        }
        Ok(Self { start, middle, end })
    }

    pub fn past_label(&self) -> String {
        format!("{}-{} (Past)", self.start, self.middle)
    }

    pub fn projected_label(&self) -> String {
        format!("{}-{} (Projected)", self.middle, self.end)
    }
}

/// One bar of the growth chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRate {
    pub borough: String,
    pub period: String,
    pub growth_rate: f64,
}

/// Past and projected population growth per borough.
///
/// Boroughs missing any of the three years, or with a zero base, are
/// dropped. Output is sorted by borough, past before projected.
pub fn growth_rates(rows: &[BoroughPopulation], years: GrowthYears) -> Vec<GrowthRate> {
    let mut by_borough: BTreeMap<&str, HashMap<i64, i64>> = BTreeMap::new();
    for row in rows {
        by_borough
            .entry(row.borough.as_str())
            .or_default()
            .insert(row.year, row.population);
    }

    let mut out = Vec::new();
    for (borough, series) in by_borough {
        let (Some(&start), Some(&middle), Some(&end)) = (
            series.get(&years.start),
            series.get(&years.middle),
            series.get(&years.end),
        ) else {
            continue;
        };

        let past = percentage_change(start as f64, middle as f64);
        let projected = percentage_change(middle as f64, end as f64);
        let (Some(past), Some(projected)) = (past, projected) else {
            continue;
        };

        out.push(GrowthRate {
            borough: borough.to_string(),
            period: years.past_label(),
            growth_rate: past,
        });
        out.push(GrowthRate {
            borough: borough.to_string(),
            period: years.projected_label(),
            growth_rate: projected,
        });
    }
    out
}
