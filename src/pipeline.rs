use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use crate::concentration::{self, Concentration};
use crate::config::AnalysisConfig;
use crate::distribution::{self, Distribution};
use crate::geography;
use crate::loader;
use crate::models::{CitySummary, ProfessionSummary, TransactionTable};
use crate::professions;
use crate::segmentation::{self, Segmentation};

/// Results of the five independent analyses over one loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analyses {
    pub segmentation: Segmentation,
    pub concentration: Concentration,
    pub geography: Vec<CitySummary>,
    pub professions: Vec<ProfessionSummary>,
    pub distribution: Distribution,
}

pub fn run_analyses(table: &TransactionTable, config: &AnalysisConfig) -> Analyses {
    let records = &table.records;

    let segmentation = segmentation::analyze_segments(records, config.top_pct);
    info!("Segmented {} products", segmentation.products.len());

    let concentration = concentration::analyze_abc(records);
    info!("Ranked {} products by revenue contribution", concentration.products.len());

    let geography = geography::analyze_geography(records, config.geo_top_n);
    info!("Kept {} cities", geography.len());

    let professions = professions::analyze_professions(records, config.profession_top_n);
    info!("Kept {} professions", professions.len());

    let distribution = distribution::analyze_distribution(records);
    info!("Normalized {} revenue values", distribution.data.len());

    Analyses {
        segmentation,
        concentration,
        geography,
        professions,
        distribution,
    }
}

/// Load the invoice file and run every analysis. A load failure stops everything.
pub fn prepare(
    csv: &Path,
    config: &AnalysisConfig,
) -> anyhow::Result<(TransactionTable, Analyses)> {
    let table = loader::load_transactions(csv)
        .with_context(|| format!("failed to load transactions from {}", csv.display()))?;
    if table.is_empty() {
        warn!("{} has no transactions; every analysis will be empty", csv.display());
    }
    let analyses = run_analyses(&table, config);
    Ok((table, analyses))
}
