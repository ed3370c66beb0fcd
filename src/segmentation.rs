use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::models::{Category, ProductSummary, TransactionRecord};
use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    pub products: Vec<ProductSummary>,
    pub top_pct: f64,
    pub revenue_threshold: Option<f64>,
    pub quantity_threshold: Option<f64>,
}

impl Segmentation {
    pub fn count(&self, category: Category) -> usize {
        self.products
            .iter()
            .filter(|product| product.category == category)
            .count()
    }
}

/// Strictly above both thresholds is a Star; exactly at a threshold is not "top".
pub fn classify(revenue: f64, qty: f64, revenue_threshold: f64, quantity_threshold: f64) -> Category {
    let high_rev = revenue > revenue_threshold;
    let high_vol = qty > quantity_threshold;

    match (high_rev, high_vol) {
        (true, true) => Category::Star,
        (true, false) => Category::Premium,
        (false, true) => Category::Volume,
        (false, false) => Category::Standard,
    }
}

pub fn analyze_segments(records: &[TransactionRecord], top_pct: f64) -> Segmentation {
    let mut map: BTreeMap<&str, (f64, f64, HashSet<&str>)> = BTreeMap::new();

    for record in records {
        let entry = map
            .entry(record.product_id.as_str())
            .or_insert_with(|| (0.0, 0.0, HashSet::new()));
        entry.0 += record.revenue;
        entry.1 += record.qty;
        if !record.email.is_empty() {
            entry.2.insert(record.email.as_str());
        }
    }

    let revenues: Vec<f64> = map.values().map(|(revenue, _, _)| *revenue).collect();
    let quantities: Vec<f64> = map.values().map(|(_, qty, _)| *qty).collect();
    let revenue_threshold = stats::quantile(&revenues, 1.0 - top_pct);
    let quantity_threshold = stats::quantile(&quantities, 1.0 - top_pct);

    let (Some(rev_cut), Some(qty_cut)) = (revenue_threshold, quantity_threshold) else {
        return Segmentation {
            products: Vec::new(),
            top_pct,
            revenue_threshold,
            quantity_threshold,
        };
    };

    let total: f64 = revenues.iter().sum();
    let products = map
        .into_iter()
        .map(|(product_id, (total_revenue, qty, customers))| ProductSummary {
            product_id: product_id.to_string(),
            total_revenue,
            qty,
            nb_customers: customers.len(),
            category: classify(total_revenue, qty, rev_cut, qty_cut),
            market_share: stats::ratio_or_zero(total_revenue * 100.0, total),
        })
        .collect();

    Segmentation {
        products,
        top_pct,
        revenue_threshold,
        quantity_threshold,
    }
}
