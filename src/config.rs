//! Tunables for scanning, weighting and banding.
//!
//! Loaded from TOML; every field has a default, so a partial file works.
//!
//! ```toml
//! [weights]
//! navigate = 10.0
//! attenuation = 0.2
//!
//! [scan]
//! extensions = ["ts", "tsx", "js"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::Activity;
use crate::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoiConfig {
    pub weights: WeightConfig,
    pub scan: ScanConfig,
    pub bands: BandThresholds,
}

impl DoiConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.scan.validate()?;
        self.bands.validate()
    }
}

/// Activity magnitudes and the propagation/decay model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Credit for an edit event.
    pub edit: f64,
    /// Credit for a navigation event. Larger than `edit`: viewing a file is a
    /// stronger relevance signal than an incidental change.
    pub navigate: f64,
    /// Subtracted from every node after each activity event.
    pub decay: f64,
    /// Factor applied per hop when spreading credit to neighbors.
    pub attenuation: f64,
    /// Maximum adjacency distance that still receives credit.
    pub hop_bound: usize,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            edit: 5.0,
            navigate: 10.0,
            decay: 0.05,
            attenuation: 0.2,
            hop_bound: 1,
        }
    }
}

impl WeightConfig {
    pub fn magnitude(&self, activity: Activity) -> f64 {
        match activity {
            Activity::Edit => self.edit,
            Activity::Navigate => self.navigate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.edit > 0.0 && self.edit.is_finite()) {
            return Err(Error::Config(format!("weights.edit must be positive, got {}", self.edit)));
        }
        if !(self.navigate > 0.0 && self.navigate.is_finite()) {
            return Err(Error::Config(format!(
                "weights.navigate must be positive, got {}",
                self.navigate
            )));
        }
        if !(self.decay >= 0.0 && self.decay.is_finite()) {
            return Err(Error::Config(format!(
                "weights.decay must be non-negative, got {}",
                self.decay
            )));
        }
        if !(0.0..=1.0).contains(&self.attenuation) {
            return Err(Error::Config(format!(
                "weights.attenuation must be within [0, 1], got {}",
                self.attenuation
            )));
        }
        Ok(())
    }
}

/// What the scanner walks and parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extensions (without dot) whose files are parsed for imports.
    pub extensions: Vec<String>,
    /// Extension assumed for extension-less references.
    pub default_extension: String,
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["ts".to_string(), "js".to_string()],
            default_extension: "ts".to_string(),
            exclude_dirs: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// True if a file with this path should be parsed for imports.
    pub fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_extension.trim_start_matches('.').is_empty() {
            return Err(Error::Config("scan.default_extension must not be empty".into()));
        }
        Ok(())
    }
}

/// Ascending cutoffs for the presentation bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self { low: 25.0, medium: 50.0, high: 100.0 }
    }
}

impl BandThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.low >= 0.0 && self.low < self.medium && self.medium < self.high) {
            return Err(Error::Config(format!(
                "bands must ascend (0 <= low < medium < high), got {} / {} / {}",
                self.low, self.medium, self.high
            )));
        }
        Ok(())
    }
}
