use std::collections::{BTreeMap, HashSet};

use crate::models::{CitySummary, TransactionRecord};
use crate::stats;

const REVENUE_WEIGHT: f64 = 0.4;
const BASKET_WEIGHT: f64 = 0.3;
const CUSTOMER_WEIGHT: f64 = 0.3;
const SCORE_SCALE: f64 = 10.0;

#[derive(Default)]
struct CityAcc<'a> {
    revenue: f64,
    transactions: usize,
    customers: HashSet<&'a str>,
}

/// Composite potential score on a 0-10 scale. A term whose maximum is zero contributes nothing.
pub fn potential_score(
    revenue: f64,
    avg_basket: f64,
    customers: f64,
    maxima: (f64, f64, f64),
) -> f64 {
    let (max_revenue, max_basket, max_customers) = maxima;
    SCORE_SCALE
        * (stats::ratio_or_zero(revenue, max_revenue) * REVENUE_WEIGHT
            + stats::ratio_or_zero(avg_basket, max_basket) * BASKET_WEIGHT
            + stats::ratio_or_zero(customers, max_customers) * CUSTOMER_WEIGHT)
}

/// Top `top_n` cities by revenue. Scores are normalised over every city, not only the retained ones.
pub fn analyze_geography(records: &[TransactionRecord], top_n: usize) -> Vec<CitySummary> {
    let mut map: BTreeMap<&str, CityAcc> = BTreeMap::new();
    for record in records {
        let acc = map.entry(record.city.as_str()).or_default();
        acc.revenue += record.revenue;
        acc.transactions += 1;
        if !record.email.is_empty() {
            acc.customers.insert(record.email.as_str());
        }
    }

    let mut cities: Vec<CitySummary> = map
        .into_iter()
        .map(|(city, acc)| {
            let nb_customers = acc.customers.len();
            CitySummary {
                city: city.to_string(),
                total_revenue: acc.revenue,
                nb_customers,
                nb_transactions: acc.transactions,
                avg_basket: stats::ratio_or_zero(acc.revenue, acc.transactions as f64),
                revenue_per_customer: stats::ratio_or_zero(acc.revenue, nb_customers as f64),
                score: 0.0,
            }
        })
        .collect();

    let maxima = (
        stats::max(cities.iter().map(|c| c.total_revenue)).unwrap_or(0.0),
        stats::max(cities.iter().map(|c| c.avg_basket)).unwrap_or(0.0),
        stats::max(cities.iter().map(|c| c.nb_customers as f64)).unwrap_or(0.0),
    );
    for city in cities.iter_mut() {
        city.score = potential_score(
            city.total_revenue,
            city.avg_basket,
            city.nb_customers as f64,
            maxima,
        );
    }

    cities.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    cities.truncate(top_n);
    cities
}
