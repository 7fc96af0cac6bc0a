use crate::data::SalesRecord;
use crate::metric::Metric;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A categorical column records can be grouped on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    City,
    Gender,
    Payment,
    ProductLine,
    Date,
}

impl Dimension {
    /// Column label as it appears in the dataset header
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::City => "City",
            Dimension::Gender => "Gender",
            Dimension::Payment => "Payment",
            Dimension::ProductLine => "Product line",
            Dimension::Date => "Date",
        }
    }

    /// Group key for a record. Dates use ISO form so that key order is chronological.
    pub fn key(&self, record: &SalesRecord) -> String {
        match self {
            Dimension::City => record.city.clone(),
            Dimension::Gender => record.gender.clone(),
            Dimension::Payment => record.payment.clone(),
            Dimension::ProductLine => record.product_line.clone(),
            Dimension::Date => record.date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One output row: the key values (one per dimension) and the reduced metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub keys: Vec<String>,
    pub value: f64,
}

/// Result of grouping a record set on one or two dimensions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedTable {
    pub dimensions: Vec<Dimension>,
    pub metric: Metric,
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of a dimension within each row's key vector
    pub fn key_index(&self, dimension: Dimension) -> Option<usize> {
        self.dimensions.iter().position(|d| *d == dimension)
    }

    /// Look up a row by its full key tuple
    pub fn value_for(&self, keys: &[&str]) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.keys.iter().map(String::as_str).eq(keys.iter().copied()))
            .map(|row| row.value)
    }
}

/// The five tables one render needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub city: AggregatedTable,
    pub gender_city: AggregatedTable,
    pub payment: AggregatedTable,
    pub date: AggregatedTable,
    pub product_city: AggregatedTable,
}

/// Group records on the given dimensions and reduce the metric per group.
/// Rows come out sorted by key tuple.
pub fn group_by<'a, I>(records: I, dimensions: &[Dimension], metric: Metric) -> AggregatedTable
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut groups: BTreeMap<Vec<String>, (f64, usize)> = BTreeMap::new();

    for record in records {
        let key: Vec<String> = dimensions.iter().map(|d| d.key(record)).collect();
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += metric.value(record);
        entry.1 += 1;
    }

    let reducer = metric.reducer();
    let rows = groups
        .into_iter()
        .map(|(keys, (sum, count))| AggregatedRow {
            keys,
            value: reducer.finish(sum, count),
        })
        .collect();

    AggregatedTable {
        dimensions: dimensions.to_vec(),
        metric,
        rows,
    }
}

/// Filter records to the selected cities and build every table
pub fn aggregate(
    records: &[SalesRecord],
    selected_cities: &BTreeSet<String>,
    metric: Metric,
) -> Aggregates {
    let filtered: Vec<&SalesRecord> = records
        .iter()
        .filter(|r| selected_cities.contains(&r.city))
        .collect();

    Aggregates {
        city: group_by(filtered.iter().copied(), &[Dimension::City], metric),
        gender_city: group_by(
            filtered.iter().copied(),
            &[Dimension::Gender, Dimension::City],
            metric,
        ),
        payment: group_by(filtered.iter().copied(), &[Dimension::Payment], metric),
        date: group_by(filtered.iter().copied(), &[Dimension::Date], metric),
        product_city: group_by(
            filtered.iter().copied(),
            &[Dimension::ProductLine, Dimension::City],
            metric,
        ),
    }
}
