use crate::error::{DashError, DashResult};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns the loader needs; anything else in the file is ignored
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "City",
    "Gender",
    "Payment",
    "Date",
    "Product line",
    "gross income",
    "Rating",
];

/// Accepted Date layouts, tried in order
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// One row of the sales dataset
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub city: String,
    pub gender: String,
    pub payment: String,
    pub product_line: String,
    pub date: NaiveDate,
    pub gross_income: f64,
    pub rating: f64,
}

/// Row as it appears in the CSV, before the Date column is normalised
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Payment")]
    payment: String,
    #[serde(rename = "Product line")]
    product_line: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "gross income")]
    gross_income: f64,
    #[serde(rename = "Rating")]
    rating: f64,
}

/// The full, read-only record set. Loaded once and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<SalesRecord>,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    /// Load the dataset from a CSV file on disk
    pub fn load(path: impl AsRef<Path>) -> DashResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DashError::DataUnavailable(format!("cannot open '{}': {}", path.display(), e))
        })?;

        Self::from_reader(file).map_err(|e| match e {
            DashError::DataUnavailable(msg) => {
                DashError::DataUnavailable(format!("'{}': {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse CSV data with a header row. Any malformed row fails the whole load.
    pub fn from_reader<R: Read>(reader: R) -> DashResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| DashError::DataUnavailable(format!("failed to read header row: {}", e)))?
            .clone();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .collect();
        if !missing.is_empty() {
            return Err(DashError::DataUnavailable(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let mut records = Vec::new();
        for (idx, result) in csv_reader.deserialize::<RawRecord>().enumerate() {
            let row = idx + 1;
            let raw = result
                .map_err(|e| DashError::DataUnavailable(format!("row {}: {}", row, e)))?;

            let date = parse_date(&raw.date).ok_or_else(|| {
                DashError::DataUnavailable(format!(
                    "row {}: unparseable Date value '{}'",
                    row, raw.date
                ))
            })?;

            records.push(SalesRecord {
                city: raw.city,
                gender: raw.gender,
                payment: raw.payment,
                product_line: raw.product_line,
                date,
                gross_income: raw.gross_income,
                rating: raw.rating,
            });
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct cities, most frequent first. Ties keep first-appearance order.
    pub fn cities_by_frequency(&self) -> Vec<String> {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (idx, record) in self.records.iter().enumerate() {
            counts.entry(record.city.as_str()).or_insert((0, idx)).0 += 1;
        }

        let mut cities: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(city, (count, first_seen))| (city, count, first_seen))
            .collect();
        cities.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        cities.into_iter().map(|(city, _, _)| city.to_string()).collect()
    }
}

/// Parse a Date cell in any of the accepted layouts
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value.trim(), fmt).ok())
}
