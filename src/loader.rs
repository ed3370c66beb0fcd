use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{TransactionRecord, TransactionTable};

pub const DATE_FORMAT: &str = "%d/%m/%Y";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "product_id",
    "email",
    "city",
    "job",
    "invoice_date",
    "qty",
    "amount",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("required column `{0}` is missing")]
    MissingColumn(&'static str),
    #[error("malformed CSV input")]
    Csv(#[from] csv::Error),
    #[error("line {line}: column `{column}` is not a finite number: {value:?}")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
}

#[derive(Deserialize)]
struct CsvRow {
    product_id: String,
    email: String,
    city: String,
    job: String,
    invoice_date: String,
    qty: String,
    amount: String,
}

pub fn load_transactions(path: &Path) -> Result<TransactionTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let table = read_transactions(file, source)?;
    let null_dates = table.null_dates();
    if null_dates > 0 {
        warn!(
            "{null_dates} of {} rows have a date not matching {DATE_FORMAT}",
            table.len()
        );
    }
    info!("Loaded {} transactions from {}", table.len(), path.display());
    Ok(table)
}

pub fn read_transactions<R: std::io::Read>(
    input: R,
    source: impl Into<String>,
) -> Result<TransactionTable, LoadError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header.trim() == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let trimmed = csv::StringRecord::from(headers.iter().map(str::trim).collect::<Vec<_>>());
    let mut records = Vec::new();

    for result in reader.records() {
        let raw = result?;
        let line = raw.position().map(|pos| pos.line()).unwrap_or_default();
        let row: CsvRow = raw.deserialize(Some(&trimmed))?;

        let qty = parse_number(&row.qty, "qty", line)?;
        let amount = parse_number(&row.amount, "amount", line)?;

        records.push(TransactionRecord {
            product_id: row.product_id,
            email: row.email,
            city: row.city,
            job: row.job,
            invoice_date: parse_date(&row.invoice_date),
            qty,
            amount,
            revenue: qty * amount,
        });
    }

    Ok(TransactionTable::new(source, records))
}

/// Day/month/year; anything else is a null date, never an error.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

fn parse_number(value: &str, column: &'static str, line: u64) -> Result<f64, LoadError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| LoadError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        })
}
