use std::fs;
use std::path::Path;

use anyhow::{ensure, Context};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Share of products treated as "top" for the segmentation thresholds.
    pub top_pct: f64,
    pub geo_top_n: usize,
    pub profession_top_n: usize,
    pub histogram_bins: usize,
    pub byline: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_pct: 0.20,
            geo_top_n: 15,
            profession_top_n: 10,
            histogram_bins: 50,
            byline: "Team: Analytics".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.top_pct > 0.0 && self.top_pct <= 1.0,
            "top_pct must be in (0, 1], got {}",
            self.top_pct
        );
        ensure!(self.geo_top_n >= 1, "geo_top_n must be at least 1");
        ensure!(self.profession_top_n >= 1, "profession_top_n must be at least 1");
        ensure!(self.histogram_bins >= 1, "histogram_bins must be at least 1");
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
