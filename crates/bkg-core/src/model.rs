//! Result shapes shared by the query layer, the charts and the web API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Regions that aggregate boroughs rather than being boroughs themselves.
pub const AGGREGATE_REGIONS: &[&str] = &[
    "City of London",
    "Inner London",
    "Outer London",
    "Greater London",
];

/// Whether a region name is one of [`AGGREGATE_REGIONS`].
pub fn is_aggregate_region(name: &str) -> bool {
    AGGREGATE_REGIONS.contains(&name)
}

/// One (borough, year, population) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoroughPopulation {
    pub borough: String,
    pub year: i64,
    pub population: i64,
}

/// Business survival figures for one borough and year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurvivalRates {
    pub borough: String,
    pub year: i64,
    pub businesses_started: Option<i64>,
    pub one_year_rate: Option<f64>,
    pub two_year_rate: Option<f64>,
    pub three_year_rate: Option<f64>,
    pub four_year_rate: Option<f64>,
    pub five_year_rate: Option<f64>,
}

impl SurvivalRates {
    pub fn rate(&self, period: SurvivalPeriod) -> Option<f64> {
        match period {
            SurvivalPeriod::OneYear => self.one_year_rate,
            SurvivalPeriod::TwoYear => self.two_year_rate,
            SurvivalPeriod::ThreeYear => self.three_year_rate,
            SurvivalPeriod::FourYear => self.four_year_rate,
            SurvivalPeriod::FiveYear => self.five_year_rate,
        }
    }
}

/// Survival horizon, 1 to 5 years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivalPeriod {
    OneYear,
    TwoYear,
    ThreeYear,
    FourYear,
    FiveYear,
}

impl SurvivalPeriod {
    pub const ALL: [SurvivalPeriod; 5] = [
        SurvivalPeriod::OneYear,
        SurvivalPeriod::TwoYear,
        SurvivalPeriod::ThreeYear,
        SurvivalPeriod::FourYear,
        SurvivalPeriod::FiveYear,
    ];

    /// Node property holding this rate.
    pub fn property(&self) -> &'static str {
        match self {
            SurvivalPeriod::OneYear => "one_year_rate",
            SurvivalPeriod::TwoYear => "two_year_rate",
            SurvivalPeriod::ThreeYear => "three_year_rate",
            SurvivalPeriod::FourYear => "four_year_rate",
            SurvivalPeriod::FiveYear => "five_year_rate",
        }
    }

    /// Legend label.
    pub fn label(&self) -> &'static str {
        match self {
            SurvivalPeriod::OneYear => "1 Year",
            SurvivalPeriod::TwoYear => "2 Years",
            SurvivalPeriod::ThreeYear => "3 Years",
            SurvivalPeriod::FourYear => "4 Years",
            SurvivalPeriod::FiveYear => "5 Years",
        }
    }

    pub fn years(&self) -> u8 {
        *self as u8 + 1
    }
}

impl fmt::Display for SurvivalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

impl FromStr for SurvivalPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SurvivalPeriod::ALL
            .into_iter()
            .find(|p| p.property() == s || p.years().to_string() == s)
            .ok_or_else(|| CoreError::config(format!("unknown survival period '{}'", s)))
    }
}

/// Which survival periods a chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurvivalSelection {
    #[default]
    All,
    Only(SurvivalPeriod),
}

impl SurvivalSelection {
    pub fn periods(&self) -> Vec<SurvivalPeriod> {
        match self {
            SurvivalSelection::All => SurvivalPeriod::ALL.to_vec(),
            SurvivalSelection::Only(p) => vec![*p],
        }
    }
}

impl FromStr for SurvivalSelection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "all" {
            Ok(SurvivalSelection::All)
        } else {
            s.parse().map(SurvivalSelection::Only)
        }
    }
}

/// Population, business count and their ratio for one borough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoroughDensity {
    pub borough: String,
    pub population: i64,
    pub business_count: i64,
    pub business_to_population_ratio: f64,
}

/// Aggregated business count and population for one borough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessPopulation {
    pub borough: String,
    pub business_count: i64,
    pub population: i64,
}

/// One `source -[relation]-> target` row for the graph view.
///
/// Endpoints are property maps; the query projects `labels` into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub source: Map<String, Value>,
    pub relation: String,
    pub target: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_round_trip_names() {
        assert_eq!("three_year_rate".parse::<SurvivalPeriod>().unwrap(), SurvivalPeriod::ThreeYear);
        assert_eq!("5".parse::<SurvivalPeriod>().unwrap(), SurvivalPeriod::FiveYear);
        assert!("six_year_rate".parse::<SurvivalPeriod>().is_err());
        assert_eq!(SurvivalPeriod::TwoYear.label(), "2 Years");
        assert_eq!(SurvivalPeriod::OneYear.years(), 1);
    }

    #[test]
    fn test_selection() {
        assert_eq!("all".parse::<SurvivalSelection>().unwrap().periods().len(), 5);
        assert_eq!(
            "two_year_rate".parse::<SurvivalSelection>().unwrap().periods(),
            vec![SurvivalPeriod::TwoYear]
        );
    }

    #[test]
    fn test_rate_lookup() {
        let rates = SurvivalRates {
            borough: "Merton".into(),
            year: 2016,
            four_year_rate: Some(52.0),
            ..Default::default()
        };
        assert_eq!(rates.rate(SurvivalPeriod::FourYear), Some(52.0));
        assert_eq!(rates.rate(SurvivalPeriod::OneYear), None);
    }

    #[test]
    fn test_aggregate_regions() {
        assert!(is_aggregate_region("Inner London"));
        assert!(!is_aggregate_region("Merton"));
    }
}
