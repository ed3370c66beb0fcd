use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{AbcClass, ConcentrationSummary, TransactionRecord};
use crate::stats;

pub const CLASS_A_LIMIT: f64 = 80.0;
pub const CLASS_B_LIMIT: f64 = 95.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Concentration {
    pub products: Vec<ConcentrationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub class: AbcClass,
    pub products: usize,
    pub revenue_pct: f64,
}

impl Concentration {
    pub fn class_summary(&self) -> Vec<ClassSummary> {
        AbcClass::ALL
            .into_iter()
            .map(|class| {
                let members = self.products.iter().filter(|p| p.class == class);
                let (products, revenue_pct) = members
                    .fold((0, 0.0), |(count, pct), p| (count + 1, pct + p.contrib_pct));
                ClassSummary {
                    class,
                    products,
                    revenue_pct,
                }
            })
            .collect()
    }
}

pub fn classify_cumulative(cumulative_pct: f64) -> AbcClass {
    if cumulative_pct <= CLASS_A_LIMIT {
        AbcClass::A
    } else if cumulative_pct <= CLASS_B_LIMIT {
        AbcClass::B
    } else {
        AbcClass::C
    }
}

/// Products by descending revenue; equal revenues keep ascending product id order.
pub fn analyze_abc(records: &[TransactionRecord]) -> Concentration {
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *map.entry(record.product_id.as_str()).or_insert(0.0) += record.revenue;
    }

    let mut ranked: Vec<(&str, f64)> = map.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let total: f64 = ranked.iter().map(|(_, revenue)| revenue).sum();
    let mut running = 0.0;

    let products = ranked
        .into_iter()
        .enumerate()
        .map(|(idx, (product_id, total_revenue))| {
            running += total_revenue;
            let contrib_cumul = stats::ratio_or_zero(running * 100.0, total);
            ConcentrationSummary {
                product_id: product_id.to_string(),
                total_revenue,
                contrib_pct: stats::ratio_or_zero(total_revenue * 100.0, total),
                contrib_cumul,
                class: classify_cumulative(contrib_cumul),
                rank: idx + 1,
            }
        })
        .collect();

    Concentration { products }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(product_id: &str, revenue: f64) -> TransactionRecord {
        TransactionRecord {
            product_id: product_id.to_string(),
            email: "a@example.com".to_string(),
            city: "Paris".to_string(),
            job: "Engineer".to_string(),
            invoice_date: None,
            qty: 1.0,
            amount: revenue,
            revenue,
        }
    }

    #[test]
    fn boundaries_are_inclusive() {
        let records = vec![
            record("P4", 50.0),
            record("P2", 300.0),
            record("P1", 500.0),
            record("P3", 100.0),
            record("P3", 50.0),
        ];
        let result = analyze_abc(&records);

        let cumul: Vec<f64> = result.products.iter().map(|p| p.contrib_cumul).collect();
        assert_eq!(cumul, vec![50.0, 80.0, 95.0, 100.0]);

        let classes: Vec<AbcClass> = result.products.iter().map(|p| p.class).collect();
        assert_eq!(classes, vec![AbcClass::A, AbcClass::A, AbcClass::B, AbcClass::C]);

        let ids: Vec<&str> = result.products.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3", "P4"]);
        let ranks: Vec<usize> = result.products.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn cumulative_is_monotone_and_ends_at_hundred() {
        let records: Vec<TransactionRecord> = (0..37)
            .map(|i| record(&format!("P{i:02}"), 1.0 + (i * 7 % 13) as f64 * 3.3))
            .collect();
        let result = analyze_abc(&records);

        for pair in result.products.windows(2) {
            assert!(pair[1].contrib_cumul >= pair[0].contrib_cumul);
            assert!(pair[1].total_revenue <= pair[0].total_revenue);
        }
        let last = result.products.last().unwrap();
        assert!((last.contrib_cumul - 100.0).abs() < 1e-9);
        for product in &result.products {
            assert_eq!(product.class, classify_cumulative(product.contrib_cumul));
        }
    }

    #[test]
    fn ties_are_ordered_by_product_id() {
        let records = vec![record("B", 10.0), record("C", 20.0), record("A", 10.0)];
        let result = analyze_abc(&records);
        let ids: Vec<&str> = result.products.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn class_summary_counts_products_and_share() {
        let records = vec![
            record("P1", 500.0),
            record("P2", 300.0),
            record("P3", 150.0),
            record("P4", 50.0),
        ];
        let summary = analyze_abc(&records).class_summary();
        assert_eq!(summary[0].products, 2);
        assert!((summary[0].revenue_pct - 80.0).abs() < 1e-9);
        assert_eq!(summary[1].products, 1);
        assert_eq!(summary[2].products, 1);
    }

    #[test]
    fn empty_and_zero_revenue_inputs_are_safe() {
        assert!(analyze_abc(&[]).products.is_empty());

        let result = analyze_abc(&[record("P1", 0.0)]);
        assert_eq!(result.products[0].contrib_pct, 0.0);
        assert_eq!(result.products[0].class, AbcClass::A);
    }
}
