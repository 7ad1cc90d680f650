//! Typed rows for each input table.
//!
//! Column names follow the processed CSV headers exactly.

use serde::{Deserialize, Deserializer};

use super::RegionScoped;

/// One business from `businesses_with_boroughs.csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BusinessRow {
    #[serde(deserialize_with = "int_field")]
    pub osm_id: i64,
    #[serde(default, deserialize_with = "opt_text")]
    pub name_business: Option<String>,
    /// Business category, e.g. `pub`.
    #[serde(default, deserialize_with = "opt_text")]
    pub fclass: Option<String>,
    /// Resolved borough.
    #[serde(default, deserialize_with = "opt_text")]
    pub area: Option<String>,
}

impl RegionScoped for BusinessRow {
    fn region(&self) -> Option<&str> {
        self.area.as_deref()
    }
}

/// One borough-year from `housing_density_borough.csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Year", deserialize_with = "int_field")]
    pub year: i64,
    #[serde(rename = "Source", default, deserialize_with = "opt_text")]
    pub source: Option<String>,
    #[serde(rename = "Population", default, deserialize_with = "opt_int")]
    pub population: Option<i64>,
    #[serde(
        rename = "Population_per_square_kilometre",
        default,
        deserialize_with = "opt_float"
    )]
    pub population_per_sqkm: Option<f64>,
}

impl RegionScoped for PopulationRow {
    fn region(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// One borough-year from `boroughs_business_survival_rate.csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SurvivalRow {
    pub area: String,
    #[serde(deserialize_with = "int_field")]
    pub year: i64,
    #[serde(default, deserialize_with = "opt_int")]
    pub births: Option<i64>,
    #[serde(rename = "1_year_survival_rate", default, deserialize_with = "opt_float")]
    pub one_year: Option<f64>,
    #[serde(rename = "2_year_survival_rate", default, deserialize_with = "opt_float")]
    pub two_year: Option<f64>,
    #[serde(rename = "3_year_survival_rate", default, deserialize_with = "opt_float")]
    pub three_year: Option<f64>,
    #[serde(rename = "4_year_survival_rate", default, deserialize_with = "opt_float")]
    pub four_year: Option<f64>,
    #[serde(rename = "5_year_survival_rate", default, deserialize_with = "opt_float")]
    pub five_year: Option<f64>,
}

impl SurvivalRow {
    /// Survival rates in period order, 1 to 5 years.
    pub fn rates(&self) -> [Option<f64>; 5] {
        [
            self.one_year,
            self.two_year,
            self.three_year,
            self.four_year,
            self.five_year,
        ]
    }
}

impl RegionScoped for SurvivalRow {
    fn region(&self) -> Option<&str> {
        Some(&self.area)
    }
}

/// One unordered pair of adjacent boroughs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdjacencyRow {
    pub borough: String,
    pub neighbour: String,
}

/// Borough to parent region (Inner or Outer London).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContainmentRow {
    pub borough: String,
    pub parent: String,
}

impl RegionScoped for ContainmentRow {
    fn region(&self) -> Option<&str> {
        Some(&self.borough)
    }
}

fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.and_then(|s| {
        let s = s.trim();
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    }))
}

fn int_field<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let raw = String::deserialize(d)?;
    parse_int(&raw)
        .map_err(serde::de::Error::custom)?
        .ok_or_else(|| serde::de::Error::custom("missing required integer"))
}

fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw {
        Some(s) => parse_int(&s).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn opt_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw {
        Some(s) => parse_float(&s).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Integer cell. Accepts `2020` and `2020.0`; fractional values truncate.
pub(crate) fn parse_int(raw: &str) -> Result<Option<i64>, String> {
    let s = raw.trim();
    if is_blank(s) {
        return Ok(None);
    }
    if let Ok(v) = s.parse::<i64>() {
        return Ok(Some(v));
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v.trunc() as i64)),
        _ => Err(format!("invalid integer '{}'", s)),
    }
}

pub(crate) fn parse_float(raw: &str) -> Result<Option<f64>, String> {
    let s = raw.trim();
    if is_blank(s) {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(format!("invalid number '{}'", s)),
    }
}

fn is_blank(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_csv;
    use std::path::Path;

    #[test]
    fn test_parse_int_variants() {
        assert_eq!(parse_int("2020"), Ok(Some(2020)));
        assert_eq!(parse_int("2020.0"), Ok(Some(2020)));
        assert_eq!(parse_int(" 100000 "), Ok(Some(100000)));
        assert_eq!(parse_int(""), Ok(None));
        assert_eq!(parse_int("NaN"), Ok(None));
        assert!(parse_int("twenty").is_err());
    }

    #[test]
    fn test_parse_float_variants() {
        assert_eq!(parse_float("93.5"), Ok(Some(93.5)));
        assert_eq!(parse_float("nan"), Ok(None));
        assert_eq!(parse_float(""), Ok(None));
        assert!(parse_float("n/a").is_err());
    }

    #[test]
    fn test_population_rows() {
        let text = "Code,Name,Year,Source,Population,Hectares,Population_per_square_kilometre\n\
                    E09000024,Merton,2020,GLA Population Projections,100000.0,3762,5585.4\n\
                    E09000029,Sutton,2021,ONS,,4385,\n";
        let rows: Vec<PopulationRow> = parse_csv(text, Path::new("population.csv")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Merton");
        assert_eq!(rows[0].year, 2020);
        assert_eq!(rows[0].population, Some(100000));
        assert_eq!(rows[0].population_per_sqkm, Some(5585.4));
        assert_eq!(rows[1].population, None);
        assert_eq!(rows[1].population_per_sqkm, None);
    }

    #[test]
    fn test_survival_rows_keep_gaps() {
        let text = "code,area,year,births,1_year_survival_rate,2_year_survival_rate,3_year_survival_rate,4_year_survival_rate,5_year_survival_rate\n\
                    E09000024,Merton,2016,1500,93.1,75.2,,50.0,\n";
        let rows: Vec<SurvivalRow> = parse_csv(text, Path::new("survival.csv")).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.births, Some(1500));
        assert_eq!(row.rates(), [Some(93.1), Some(75.2), None, Some(50.0), None]);
    }

    #[test]
    fn test_bad_year_is_an_error() {
        let text = "Name,Year,Source,Population,Population_per_square_kilometre\nMerton,soon,ONS,1,1\n";
        let result: crate::CoreResult<Vec<PopulationRow>> =
            parse_csv(text, Path::new("population.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_business_without_name() {
        let text = "osm_id,name_business,fclass,area\n42,,atm,Camden\n";
        let rows: Vec<BusinessRow> = parse_csv(text, Path::new("b.csv")).unwrap();
        assert_eq!(rows[0].name_business, None);
        assert_eq!(rows[0].fclass.as_deref(), Some("atm"));
        assert_eq!(rows[0].region(), Some("Camden"));
    }
}
