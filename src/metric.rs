use crate::data::SalesRecord;
use crate::error::DashError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The numeric field under analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "gross income")]
    #[default]
    GrossIncome,
    #[serde(rename = "Rating")]
    Rating,
}

/// How a group of metric values collapses into one number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Sum,
    Mean,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::GrossIncome, Metric::Rating];

    /// Column name, also the label shown in the UI
    pub fn label(&self) -> &'static str {
        match self {
            Metric::GrossIncome => "gross income",
            Metric::Rating => "Rating",
        }
    }

    /// Income is summed, ratings are averaged. Never the other way round.
    pub fn reducer(&self) -> Reducer {
        match self {
            Metric::GrossIncome => Reducer::Sum,
            Metric::Rating => Reducer::Mean,
        }
    }

    pub fn value(&self, record: &SalesRecord) -> f64 {
        match self {
            Metric::GrossIncome => record.gross_income,
            Metric::Rating => record.rating,
        }
    }
}

impl FromStr for Metric {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.label() == s)
            .ok_or_else(|| {
                DashError::InvalidArgument(format!(
                    "unknown metric '{}' (expected \"gross income\" or \"Rating\")",
                    s
                ))
            })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Reducer {
    /// Reduce a running (sum, count) pair. An empty group yields 0.
    pub fn finish(&self, sum: f64, count: usize) -> f64 {
        match self {
            Reducer::Sum => sum,
            Reducer::Mean if count == 0 => 0.0,
            Reducer::Mean => sum / count as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_metrics() {
        assert_eq!("gross income".parse::<Metric>().unwrap(), Metric::GrossIncome);
        assert_eq!("Rating".parse::<Metric>().unwrap(), Metric::Rating);
    }

    #[test]
    fn test_parse_rejects_unknown_metric() {
        for bad in ["rating", "Gross Income", "Total", ""] {
            let err = bad.parse::<Metric>().unwrap_err();
            assert!(matches!(err, DashError::InvalidArgument(_)), "{:?}", bad);
        }
    }

    #[test]
    fn test_reducer_mapping_is_fixed() {
        assert_eq!(Metric::GrossIncome.reducer(), Reducer::Sum);
        assert_eq!(Metric::Rating.reducer(), Reducer::Mean);
    }

    #[test]
    fn test_reducer_finish() {
        assert_eq!(Reducer::Sum.finish(9.0, 3), 9.0);
        assert_eq!(Reducer::Mean.finish(9.0, 3), 3.0);
        assert_eq!(Reducer::Mean.finish(0.0, 0), 0.0);
    }

    #[test]
    fn test_default_and_serde_labels() {
        assert_eq!(Metric::default(), Metric::GrossIncome);
        assert_eq!(
            serde_json::to_string(&Metric::GrossIncome).unwrap(),
            "\"gross income\""
        );
        assert_eq!(
            serde_json::from_str::<Metric>("\"Rating\"").unwrap(),
            Metric::Rating
        );
    }
}
