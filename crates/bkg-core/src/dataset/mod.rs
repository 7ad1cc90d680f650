//! Tabular input datasets.
//!
//! Each CSV is read with the `csv` crate straight into typed rows. Numeric
//! cells are coerced while deserializing so a bad cell fails the whole file
//! with the row position attached.

pub mod boundaries;
pub mod rows;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

pub use boundaries::Boundaries;
pub use rows::{AdjacencyRow, BusinessRow, ContainmentRow, PopulationRow, SurvivalRow};

/// Rows that belong to a region and can be scoped by a [`BoroughFilter`].
pub trait RegionScoped {
    fn region(&self) -> Option<&str>;
}

/// Optional allow-list of region names.
///
/// An inactive filter lets everything through. An active one keeps only rows
/// whose region is listed; rows with no region are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoroughFilter {
    allowed: Option<BTreeSet<String>>,
}

impl BoroughFilter {
    /// A filter that keeps every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Keep only the given regions. An empty list means no filtering.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            Self::all()
        } else {
            Self {
                allowed: Some(allowed),
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.allowed.is_some()
    }

    /// Whether a region passes the filter.
    pub fn allows(&self, name: &str) -> bool {
        match &self.allowed {
            Some(set) => set.contains(name),
            None => true,
        }
    }

    /// Like [`allows`](Self::allows) for a region that may be missing.
    pub fn allows_opt(&self, name: Option<&str>) -> bool {
        match (&self.allowed, name) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(set), Some(n)) => set.contains(n),
        }
    }

    /// Listed region names, sorted. Empty when inactive.
    pub fn names(&self) -> Vec<String> {
        self.allowed
            .as_ref()
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Keep the rows that pass the filter.
    pub fn retain<T: RegionScoped>(&self, rows: Vec<T>) -> Vec<T> {
        if !self.is_active() {
            return rows;
        }
        rows.into_iter()
            .filter(|row| self.allows_opt(row.region()))
            .collect()
    }
}

/// Read a headed CSV file into typed rows.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> CoreResult<Vec<T>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CoreError::DatasetOpen {
            path: path.to_path_buf(),
            source,
        })?;

    let rows = collect_rows(reader, path)?;
    debug!(path = %path.display(), rows = rows.len(), "Read dataset");
    Ok(rows)
}

/// Parse CSV text already in memory. `label` names the source in errors.
pub fn parse_csv<T: DeserializeOwned>(text: &str, label: &Path) -> CoreResult<Vec<T>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    collect_rows(reader, label)
}

fn collect_rows<T: DeserializeOwned, R: Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
) -> CoreResult<Vec<T>> {
    reader
        .deserialize()
        .map(|record| {
            record.map_err(|source| CoreError::DatasetRow {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}
