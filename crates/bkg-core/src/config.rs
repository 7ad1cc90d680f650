//! Application configuration file (`bkg.toml`).
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! Connection secrets are not stored here; they come from the environment
//! (see `bkg_graph::GraphConfig`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bkg.toml";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataPaths,
    pub import: ImportSettings,
}

/// Locations of the input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub businesses: PathBuf,
    pub population: PathBuf,
    pub survival: PathBuf,
    pub adjacency: PathBuf,
    pub hierarchy: PathBuf,
    pub boundaries: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            businesses: PathBuf::from("data/processed/businesses_with_boroughs.csv"),
            population: PathBuf::from("data/processed/housing_density_borough.csv"),
            survival: PathBuf::from("data/processed/boroughs_business_survival_rate.csv"),
            adjacency: PathBuf::from("data/processed/borough_adjacency.csv"),
            hierarchy: PathBuf::from("data/processed/borough_hierarchy.csv"),
            boundaries: PathBuf::from("data/processed/london_boroughs.geojson"),
        }
    }
}

impl DataPaths {
    /// Resolve every relative path against `base`.
    pub fn rebase(&self, base: &Path) -> Self {
        let join = |p: &PathBuf| if p.is_absolute() { p.clone() } else { base.join(p) };
        Self {
            businesses: join(&self.businesses),
            population: join(&self.population),
            survival: join(&self.survival),
            adjacency: join(&self.adjacency),
            hierarchy: join(&self.hierarchy),
            boundaries: join(&self.boundaries),
        }
    }
}

/// How `BusinessSurvival` nodes are keyed.
///
/// The survival table reports one row per (borough, year) but the graph has
/// historically keyed the node by year alone, so boroughs sharing a year
/// share a node. `BoroughYear` keys it per borough instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivalKey {
    #[default]
    Year,
    BoroughYear,
}

/// Import behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Region allow-list for small test builds. Empty means everything.
    pub test_boroughs: Vec<String>,
    pub survival_key: SurvivalKey,
}

impl AppConfig {
    /// Parse a config document.
    pub fn from_toml(text: &str) -> CoreResult<Self> {
        toml::from_str(text).map_err(|e| CoreError::config(e.to_string()))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `bkg.toml` in the working
    /// directory is used when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| CoreError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.import.survival_key, SurvivalKey::Year);
        assert!(config.import.test_boroughs.is_empty());
        assert_eq!(
            config.data.population,
            PathBuf::from("data/processed/housing_density_borough.csv")
        );
    }

    #[test]
    fn test_partial_document() {
        let text = r#"
            [data]
            businesses = "/srv/bkg/businesses.csv"

            [import]
            test_boroughs = ["Merton", "Sutton"]
            survival_key = "borough_year"
        "#;
        let config = AppConfig::from_toml(text).unwrap();
        assert_eq!(config.data.businesses, PathBuf::from("/srv/bkg/businesses.csv"));
        assert_eq!(
            config.data.adjacency,
            PathBuf::from("data/processed/borough_adjacency.csv")
        );
        assert_eq!(config.import.test_boroughs, vec!["Merton", "Sutton"]);
        assert_eq!(config.import.survival_key, SurvivalKey::BoroughYear);
    }

    #[test]
    fn test_unknown_survival_key_rejected() {
        let err = AppConfig::from_toml("[import]\nsurvival_key = \"borough\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_rebase_keeps_absolute_paths() {
        let paths = DataPaths {
            businesses: PathBuf::from("/abs/b.csv"),
            ..DataPaths::default()
        };
        let rebased = paths.rebase(Path::new("/project"));
        assert_eq!(rebased.businesses, PathBuf::from("/abs/b.csv"));
        assert_eq!(
            rebased.hierarchy,
            PathBuf::from("/project/data/processed/borough_hierarchy.csv")
        );
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
