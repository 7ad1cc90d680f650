//! Histogram binning for distribution charts.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// How bin edges are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinMode {
    /// Edges at evenly spaced quantiles, so bins hold similar counts.
    #[default]
    Quantile,
    /// Equal-width edges between min and max.
    Range,
}

impl FromStr for BinMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quantile" => Ok(BinMode::Quantile),
            "range" => Ok(BinMode::Range),
            other => Err(CoreError::config(format!("unknown bin mode '{}'", other))),
        }
    }
}

/// One histogram bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub label: String,
    pub highlighted: bool,
}

/// Binned values plus the bin holding the highlighted value, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub mode: BinMode,
    pub bins: Vec<Bin>,
    pub highlight: Option<usize>,
}

/// Largest bin count a caller may ask for.
pub const MAX_BINS: usize = 100;

/// Bin `values` into at most `n_bins` bins.
///
/// `n_bins` is clamped to `1..=MAX_BINS` and to the number of values.
/// Non-finite values are ignored. Quantile edges that coincide are merged,
/// so heavily tied data can produce fewer bins than requested. The last bin
/// is closed on both ends.
pub fn histogram(values: &[f64], n_bins: usize, mode: BinMode, highlight: Option<f64>) -> Histogram {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    if sorted.is_empty() {
        return Histogram {
            mode,
            bins: Vec::new(),
            highlight: None,
        };
    }

    let n = n_bins.clamp(1, MAX_BINS).min(sorted.len());
    let edges = match mode {
        BinMode::Range => range_edges(&sorted, n),
        BinMode::Quantile => quantile_edges(&sorted, n),
    };

    let bin_count = edges.len().saturating_sub(1).max(1);
    let mut counts = vec![0usize; bin_count];
    for v in &sorted {
        if let Some(i) = bin_index(&edges, *v) {
            counts[i] += 1;
        }
    }

    let highlight_idx = highlight.filter(|v| v.is_finite()).and_then(|v| bin_index(&edges, v));

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = edges[i];
            let upper = *edges.get(i + 1).unwrap_or(&lower);
            Bin {
                lower,
                upper,
                count,
                label: format!("{:.2} - {:.2}", lower, upper),
                highlighted: highlight_idx == Some(i),
            }
        })
        .collect();

    Histogram {
        mode,
        bins,
        highlight: highlight_idx,
    }
}

fn range_edges(sorted: &[f64], n: usize) -> Vec<f64> {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    if min == max {
        return vec![min, max];
    }
    let width = (max - min) / n as f64;
    let mut edges: Vec<f64> = (0..n).map(|i| min + width * i as f64).collect();
    edges.push(max);
    edges
}

fn quantile_edges(sorted: &[f64], n: usize) -> Vec<f64> {
    let mut edges: Vec<f64> = (0..=n)
        .filter_map(|i| quantile(sorted, i as f64 / n as f64))
        .collect();
    edges.dedup();
    if edges.len() == 1 {
        edges.push(edges[0]);
    }
    edges
}

/// Linear-interpolated quantile of sorted data, `q` in `[0, 1]`. `None`
/// for empty input.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn bin_index(edges: &[f64], v: f64) -> Option<usize> {
    let first = *edges.first()?;
    let last = *edges.last()?;
    if v < first || v > last {
        return None;
    }
    let bins = edges.len().saturating_sub(1).max(1);
    let idx = edges.partition_point(|e| *e <= v).saturating_sub(1);
    Some(idx.min(bins - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bins() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let h = histogram(&values, 5, BinMode::Range, Some(10.0));
        assert_eq!(h.bins.len(), 5);
        let counts: Vec<usize> = h.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 2, 1, 0, 1]);
        assert_eq!(h.highlight, Some(4));
        assert!(h.bins[4].highlighted);
        assert_eq!(h.bins[0].label, "0.00 - 2.00");
    }

    #[test]
    fn test_quantile_bins_balance_counts() {
        let values: Vec<f64> = (1..=8).map(|v| v as f64).collect();
        let h = histogram(&values, 4, BinMode::Quantile, Some(2.5));
        assert_eq!(h.bins.len(), 4);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 8);
        assert!(h.bins.iter().all(|b| b.count == 2));
        assert_eq!(h.highlight, Some(0));
    }

    #[test]
    fn test_quantile_duplicates_collapse() {
        let values = [1.0, 1.0, 1.0, 1.0, 5.0];
        let h = histogram(&values, 4, BinMode::Quantile, None);
        assert!(h.bins.len() < 4);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 5);
    }

    #[test]
    fn test_single_value() {
        let h = histogram(&[3.0, 3.0], 10, BinMode::Range, Some(3.0));
        assert_eq!(h.bins.len(), 1);
        assert_eq!(h.bins[0].count, 2);
        assert_eq!(h.highlight, Some(0));
    }

    #[test]
    fn test_empty_and_outside_highlight() {
        let h = histogram(&[], 5, BinMode::Quantile, Some(1.0));
        assert!(h.bins.is_empty());
        assert_eq!(h.highlight, None);

        let h = histogram(&[1.0, 2.0], 2, BinMode::Range, Some(9.0));
        assert_eq!(h.highlight, None);
    }

    #[test]
    fn test_nan_ignored() {
        let h = histogram(&[1.0, f64::NAN, 2.0], 2, BinMode::Range, None);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_oversized_bin_count_is_clamped() {
        let h = histogram(&[1.0, 2.0, 3.0], 1usize << 40, BinMode::Range, None);
        assert_eq!(h.bins.len(), 3);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 3);

        let h = histogram(&[1.0, 2.0, 3.0], usize::MAX, BinMode::Quantile, None);
        assert!(h.bins.len() <= 3);

        let many: Vec<f64> = (0..1000).map(|v| v as f64).collect();
        let h = histogram(&many, 5000, BinMode::Range, None);
        assert_eq!(h.bins.len(), MAX_BINS);
    }
}
