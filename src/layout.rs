// View model: static description of the dashboard's controls and chart slots

use crate::chart::ChartKind;
use crate::data::Dataset;
use crate::error::DashError;
use crate::metric::Metric;
use serde::Serialize;
use std::str::FromStr;

/// Which set of charts the dashboard shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// All five charts
    #[default]
    Full,
    /// City, payment and product-line charts only
    Simple,
}

impl Variant {
    /// Chart placeholders, grouped by display row
    pub fn rows(&self) -> Vec<Vec<ChartKind>> {
        match self {
            Variant::Full => vec![
                vec![ChartKind::City, ChartKind::Gender, ChartKind::Payment],
                vec![ChartKind::IncomeOverTime],
                vec![ChartKind::ProductLine],
            ],
            Variant::Simple => vec![
                vec![ChartKind::City],
                vec![ChartKind::Payment],
                vec![ChartKind::ProductLine],
            ],
        }
    }

    /// Charts shown by this variant, in layout order
    pub fn charts(&self) -> Vec<ChartKind> {
        self.rows().into_iter().flatten().collect()
    }
}

impl FromStr for Variant {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Variant::Full),
            "simple" => Ok(Variant::Simple),
            other => Err(DashError::InvalidArgument(format!(
                "unknown variant '{}' (expected full or simple)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoBlock {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checklist {
    pub id: String,
    pub label: String,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadioChoice {
    pub id: String,
    pub label: String,
    pub options: Vec<String>,
    pub selected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPlaceholder {
    pub id: String,
    pub kind: ChartKind,
    pub height: u32,
}

/// Everything the page needs to draw its controls and empty chart slots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub variant: Variant,
    pub logo: LogoBlock,
    pub city_checklist: Checklist,
    pub metric_choice: RadioChoice,
    pub chart_rows: Vec<Vec<ChartPlaceholder>>,
}

impl Layout {
    pub fn build(dataset: &Dataset, variant: Variant) -> Self {
        let cities = dataset.cities_by_frequency();

        Layout {
            variant,
            logo: LogoBlock {
                src: "/assets/logo.svg".to_string(),
                width: 90,
                height: 100,
            },
            city_checklist: Checklist {
                id: "check_city".to_string(),
                label: "Cities:".to_string(),
                selected: cities.clone(),
                options: cities,
            },
            metric_choice: RadioChoice {
                id: "main_variable".to_string(),
                label: "Analysis variable:".to_string(),
                options: Metric::ALL.iter().map(|m| m.label().to_string()).collect(),
                selected: Metric::default().label().to_string(),
            },
            chart_rows: variant
                .rows()
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|kind| ChartPlaceholder {
                            id: kind.id().to_string(),
                            kind,
                            height: kind.layout().height,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}
