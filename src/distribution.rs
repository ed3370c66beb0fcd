use serde::Serialize;

use crate::models::{DistributionStats, NormalizedRecord, TransactionRecord};
use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub stats: Option<DistributionStats>,
    #[serde(skip)]
    pub data: Vec<NormalizedRecord>,
}

impl Distribution {
    pub fn revenues(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().map(|row| row.record.revenue)
    }
}

pub fn describe(revenues: &[f64]) -> Option<DistributionStats> {
    Some(DistributionStats {
        mean: stats::mean(revenues)?,
        median: stats::median(revenues)?,
        std: stats::sample_std(revenues),
        min: stats::min(revenues.iter().copied())?,
        max: stats::max(revenues.iter().copied())?,
        q25: stats::quantile(revenues, 0.25)?,
        q75: stats::quantile(revenues, 0.75)?,
    })
}

/// Min-max scaling; a zero range maps every value to 0.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    stats::ratio_or_zero(value - min, max - min)
}

pub fn analyze_distribution(records: &[TransactionRecord]) -> Distribution {
    let revenues: Vec<f64> = records.iter().map(|record| record.revenue).collect();
    let summary = describe(&revenues);

    let data = match summary {
        Some(DistributionStats { min, max, .. }) => records
            .iter()
            .map(|record| NormalizedRecord {
                record: record.clone(),
                revenue_norm: normalize(record.revenue, min, max),
            })
            .collect(),
        None => Vec::new(),
    };

    Distribution {
        stats: summary,
        data,
    }
}
