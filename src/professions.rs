use std::collections::{BTreeMap, HashSet};

use crate::models::{ProfessionSummary, TransactionRecord};

pub fn analyze_professions(records: &[TransactionRecord], top_n: usize) -> Vec<ProfessionSummary> {
    let mut map: BTreeMap<&str, (f64, usize, HashSet<&str>)> = BTreeMap::new();

    for record in records {
        let entry = map
            .entry(record.job.as_str())
            .or_insert_with(|| (0.0, 0, HashSet::new()));
        entry.0 += record.revenue;
        entry.1 += 1;
        if !record.email.is_empty() {
            entry.2.insert(record.email.as_str());
        }
    }

    let mut professions: Vec<ProfessionSummary> = map
        .into_iter()
        .map(|(job, (total_revenue, count, customers))| ProfessionSummary {
            job: job.to_string(),
            total_revenue,
            avg_spend: total_revenue / count as f64,
            nb_customers: customers.len(),
        })
        .collect();

    professions.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    professions.truncate(top_n);
    professions
}
