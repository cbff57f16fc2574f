//! Presentation projections over query output.
//!
//! Nothing here touches the store. Callers pass the plain rows returned by
//! the query layer and get bands, filtered lists or folder scores back.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::BandThresholds;
use crate::model::FileNode;

/// Display bucket for a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Cold,
    Low,
    Medium,
    High,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Band::Cold => "cold",
            Band::Low => "low",
            Band::Medium => "medium",
            Band::High => "high",
        };
        f.write_str(name)
    }
}

impl BandThresholds {
    /// Strictly-above comparison against each ascending cutoff.
    pub fn classify(&self, weight: f64) -> Band {
        if weight > self.high {
            Band::High
        } else if weight > self.medium {
            Band::Medium
        } else if weight > self.low {
            Band::Low
        } else {
            Band::Cold
        }
    }
}

/// Minimum-weight filter for a file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandFilter {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl BandFilter {
    pub fn min_weight(self, thresholds: &BandThresholds) -> f64 {
        match self {
            BandFilter::None => 0.0,
            BandFilter::Low => thresholds.low,
            BandFilter::Medium => thresholds.medium,
            BandFilter::High => thresholds.high,
        }
    }
}

/// Rows whose weight reaches the filter's minimum, order preserved.
pub fn filter_ranked(rows: &[FileNode], filter: BandFilter, thresholds: &BandThresholds) -> Vec<FileNode> {
    let min = filter.min_weight(thresholds);
    rows.iter().filter(|r| r.weight >= min).cloned().collect()
}

/// Folder score: the heaviest file anywhere below `dir`, 0 if none.
pub fn directory_weight(rows: &[FileNode], dir: &Path) -> f64 {
    rows.iter()
        .filter(|r| r.path.is_within(dir))
        .map(|r| r.weight)
        .fold(0.0, f64::max)
}
