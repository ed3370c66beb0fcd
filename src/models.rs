use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub product_id: String,
    pub email: String,
    pub city: String,
    pub job: String,
    pub invoice_date: Option<NaiveDate>,
    pub qty: f64,
    pub amount: f64,
    pub revenue: f64,
}

/// Rows of one loaded invoice file. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct TransactionTable {
    pub source: String,
    pub records: Vec<TransactionRecord>,
}

impl TransactionTable {
    pub fn new(source: impl Into<String>, records: Vec<TransactionRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn null_dates(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.invoice_date.is_none())
            .count()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|record| record.invoice_date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), date| (lo.min(date), hi.max(date))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Star,
    Premium,
    Volume,
    Standard,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Star,
        Category::Premium,
        Category::Volume,
        Category::Standard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Star => "Star",
            Category::Premium => "Premium",
            Category::Volume => "Volume",
            Category::Standard => "Standard",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub product_id: String,
    pub total_revenue: f64,
    pub qty: f64,
    pub nb_customers: usize,
    pub category: Category,
    pub market_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    pub const ALL: [AbcClass; 3] = [AbcClass::A, AbcClass::B, AbcClass::C];
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationSummary {
    pub product_id: String,
    pub total_revenue: f64,
    pub contrib_pct: f64,
    pub contrib_cumul: f64,
    pub class: AbcClass,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySummary {
    pub city: String,
    pub total_revenue: f64,
    pub nb_customers: usize,
    pub nb_transactions: usize,
    pub avg_basket: f64,
    pub revenue_per_customer: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfessionSummary {
    pub job: String,
    pub total_revenue: f64,
    pub avg_spend: f64,
    pub nb_customers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub revenue_norm: f64,
}
