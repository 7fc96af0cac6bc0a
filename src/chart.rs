// Chart builders: aggregated tables -> declarative bar chart specifications

use crate::aggregate::{AggregatedTable, Aggregates, Dimension};
use crate::error::DashError;
use crate::palette::{ColorMap, DEFAULT_COLOR};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Height of the four summary charts
pub const SUMMARY_HEIGHT: u32 = 200;
/// Height of the product-line breakdown
pub const PRODUCT_HEIGHT: u32 = 500;

/// The charts the dashboard knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ChartKind {
    City,
    Gender,
    Payment,
    IncomeOverTime,
    ProductLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    #[serde(rename = "v")]
    Vertical,
    #[serde(rename = "h")]
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Relative,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartLayout {
    pub height: u32,
    pub margin: Margin,
}

/// One colored run of bars. `values` is aligned with `ChartSpec::categories`;
/// `None` means the group has no bar at that category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: Option<String>,
    pub color: String,
    pub values: Vec<Option<f64>>,
}

/// Renderer-agnostic description of a bar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub orientation: Orientation,
    pub bar_mode: BarMode,
    pub category_label: String,
    pub value_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub layout: ChartLayout,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::City,
        ChartKind::Gender,
        ChartKind::Payment,
        ChartKind::IncomeOverTime,
        ChartKind::ProductLine,
    ];

    /// Element id of the chart's placeholder on the page
    pub fn id(&self) -> &'static str {
        match self {
            ChartKind::City => "city_fig",
            ChartKind::Gender => "gender_fig",
            ChartKind::Payment => "pay_fig",
            ChartKind::IncomeOverTime => "income_per_date_fig",
            ChartKind::ProductLine => "income_per_product_fig",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::City => "By city",
            ChartKind::Gender => "By gender and city",
            ChartKind::Payment => "By payment method",
            ChartKind::IncomeOverTime => "Over time",
            ChartKind::ProductLine => "By product line and city",
        }
    }

    /// The aggregated table this chart is drawn from
    pub fn table<'a>(&self, aggregates: &'a Aggregates) -> &'a AggregatedTable {
        match self {
            ChartKind::City => &aggregates.city,
            ChartKind::Gender => &aggregates.gender_city,
            ChartKind::Payment => &aggregates.payment,
            ChartKind::IncomeOverTime => &aggregates.date,
            ChartKind::ProductLine => &aggregates.product_city,
        }
    }

    pub fn orientation(&self) -> Orientation {
        match self {
            ChartKind::Payment | ChartKind::ProductLine => Orientation::Horizontal,
            _ => Orientation::Vertical,
        }
    }

    /// Whether bars are split into one colored series per city
    pub fn split_by_city(&self) -> bool {
        matches!(self, ChartKind::Gender | ChartKind::ProductLine)
    }

    pub fn layout(&self) -> ChartLayout {
        match self {
            ChartKind::ProductLine => ChartLayout {
                height: PRODUCT_HEIGHT,
                margin: Margin { l: 0, r: 0, t: 20, b: 20 },
            },
            _ => ChartLayout {
                height: SUMMARY_HEIGHT,
                margin: Margin { l: 0, r: 0, t: 20, b: 0 },
            },
        }
    }
}

impl FromStr for ChartKind {
    type Err = DashError;

    /// Accepts the short names used on the command line as well as element ids
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "city" => ChartKind::City,
            "gender" => ChartKind::Gender,
            "payment" => ChartKind::Payment,
            "date" | "time" => ChartKind::IncomeOverTime,
            "product" | "product_line" => ChartKind::ProductLine,
            other => ChartKind::ALL
                .into_iter()
                .find(|k| k.id() == other)
                .ok_or_else(|| DashError::InvalidArgument(format!("unknown chart '{}'", other)))?,
        };
        Ok(kind)
    }
}

/// Build a chart specification from one aggregated table.
/// An empty table produces a chart with no categories and no series.
pub fn build_chart(kind: ChartKind, table: &AggregatedTable, colors: &ColorMap) -> ChartSpec {
    let category_dim = table.dimensions.first().copied().unwrap_or(Dimension::City);

    // Color split only applies when City is a secondary key
    let city_idx = table
        .key_index(Dimension::City)
        .filter(|idx| *idx > 0 && kind.split_by_city());

    // 1. Category axis, in row order (rows are already sorted)
    let mut categories: Vec<String> = Vec::new();
    for row in &table.rows {
        if !categories.contains(&row.keys[0]) {
            categories.push(row.keys[0].clone());
        }
    }

    // 2. Series
    let series = match city_idx {
        _ if table.is_empty() => Vec::new(),
        Some(idx) => {
            let cities: BTreeSet<&str> = table.rows.iter().map(|r| r.keys[idx].as_str()).collect();
            cities
                .into_iter()
                .map(|city| Series {
                    name: Some(city.to_string()),
                    color: colors.color_for(city).to_string(),
                    values: categories
                        .iter()
                        .map(|cat| {
                            table
                                .rows
                                .iter()
                                .find(|r| &r.keys[0] == cat && r.keys[idx] == city)
                                .map(|r| r.value)
                        })
                        .collect(),
                })
                .collect()
        }
        None => vec![Series {
            name: None,
            color: DEFAULT_COLOR.to_string(),
            values: categories
                .iter()
                .map(|cat| table.rows.iter().find(|r| &r.keys[0] == cat).map(|r| r.value))
                .collect(),
        }],
    };

    ChartSpec {
        kind,
        title: kind.title().to_string(),
        orientation: kind.orientation(),
        bar_mode: if city_idx.is_some() { BarMode::Group } else { BarMode::Relative },
        category_label: category_dim.label().to_string(),
        value_label: table.metric.label().to_string(),
        categories,
        series,
        layout: kind.layout(),
    }
}

/// Build every chart of `kinds` from one set of aggregates
pub fn build_charts(kinds: &[ChartKind], aggregates: &Aggregates, colors: &ColorMap) -> Vec<ChartSpec> {
    kinds
        .iter()
        .map(|kind| build_chart(*kind, kind.table(aggregates), colors))
        .collect()
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Value axis bounds, always including zero. Empty charts get `(0, 1)`.
    pub fn value_range(&self) -> (f64, f64) {
        let values = self.series.iter().flat_map(|s| s.values.iter().flatten().copied());
        let (min, max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min == max {
            (0.0, 1.0)
        } else {
            (min, max)
        }
    }

    /// Figure in the plotly `{data, layout}` shape, ready for the browser
    pub fn to_figure(&self) -> Value {
        let data: Vec<Value> = self
            .series
            .iter()
            .map(|series| {
                let (cats, vals): (Vec<&str>, Vec<f64>) = self
                    .categories
                    .iter()
                    .zip(&series.values)
                    .filter_map(|(c, v)| v.map(|v| (c.as_str(), v)))
                    .unzip();
                let (x, y) = match self.orientation {
                    Orientation::Vertical => (json!(cats), json!(vals)),
                    Orientation::Horizontal => (json!(vals), json!(cats)),
                };
                let mut trace = json!({
                    "type": "bar",
                    "orientation": self.orientation,
                    "x": x,
                    "y": y,
                    "marker": { "color": series.color },
                    "showlegend": series.name.is_some(),
                });
                if let Some(name) = &series.name {
                    trace["name"] = json!(name);
                }
                trace
            })
            .collect();

        let (x_title, y_title) = match self.orientation {
            Orientation::Vertical => (&self.category_label, &self.value_label),
            Orientation::Horizontal => (&self.value_label, &self.category_label),
        };

        json!({
            "data": data,
            "layout": {
                "barmode": self.bar_mode,
                "height": self.layout.height,
                "margin": self.layout.margin,
                "xaxis": { "title": { "text": x_title } },
                "yaxis": { "title": { "text": y_title } },
                "legend": { "title": { "text": "City" } },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregatedRow;
    use crate::metric::Metric;
    use crate::palette::ColorPalette;

    fn row(keys: &[&str], value: f64) -> AggregatedRow {
        AggregatedRow {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            value,
        }
    }

    fn table(dimensions: Vec<Dimension>, rows: Vec<AggregatedRow>) -> AggregatedTable {
        AggregatedTable {
            dimensions,
            metric: Metric::GrossIncome,
            rows,
        }
    }

    fn colors() -> ColorMap {
        ColorPalette::category10().assign_colors(&["A".to_string(), "B".to_string()])
    }

    #[test]
    fn test_single_series_chart() {
        let t = table(vec![Dimension::City], vec![row(&["A"], 30.0), row(&["B"], 5.0)]);
        let chart = build_chart(ChartKind::City, &t, &colors());

        assert_eq!(chart.orientation, Orientation::Vertical);
        assert_eq!(chart.bar_mode, BarMode::Relative);
        assert_eq!(chart.categories, vec!["A", "B"]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].values, vec![Some(30.0), Some(5.0)]);
        assert_eq!(chart.category_label, "City");
        assert_eq!(chart.value_label, "gross income");
        assert_eq!(chart.layout.height, SUMMARY_HEIGHT);
    }

    #[test]
    fn test_split_by_city_chart() {
        let t = table(
            vec![Dimension::ProductLine, Dimension::City],
            vec![
                row(&["Food", "A"], 1.0),
                row(&["Food", "B"], 2.0),
                row(&["Sports", "B"], 3.0),
            ],
        );
        let chart = build_chart(ChartKind::ProductLine, &t, &colors());

        assert_eq!(chart.orientation, Orientation::Horizontal);
        assert_eq!(chart.bar_mode, BarMode::Group);
        assert_eq!(chart.categories, vec!["Food", "Sports"]);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name.as_deref(), Some("A"));
        assert_eq!(chart.series[0].color, "#1f77b4");
        assert_eq!(chart.series[0].values, vec![Some(1.0), None]);
        assert_eq!(chart.series[1].values, vec![Some(2.0), Some(3.0)]);
        assert_eq!(chart.layout.height, PRODUCT_HEIGHT);
        assert_eq!(chart.layout.margin.b, 20);
    }

    #[test]
    fn test_empty_table_builds_empty_chart() {
        let t = table(vec![Dimension::Gender, Dimension::City], vec![]);
        let chart = build_chart(ChartKind::Gender, &t, &colors());
        assert!(chart.is_empty());
        assert!(chart.categories.is_empty());
        assert_eq!(chart.value_range(), (0.0, 1.0));

        let fig = chart.to_figure();
        assert_eq!(fig["data"].as_array().unwrap().len(), 0);
        assert_eq!(fig["layout"]["height"], 200);
    }

    #[test]
    fn test_horizontal_figure_swaps_axes() {
        let t = table(vec![Dimension::Payment], vec![row(&["Cash"], 4.0), row(&["Ewallet"], 2.0)]);
        let fig = build_chart(ChartKind::Payment, &t, &colors()).to_figure();

        let trace = &fig["data"][0];
        assert_eq!(trace["orientation"], "h");
        assert_eq!(trace["y"], json!(["Cash", "Ewallet"]));
        assert_eq!(trace["x"], json!([4.0, 2.0]));
        assert_eq!(fig["layout"]["xaxis"]["title"]["text"], "gross income");
        assert_eq!(fig["layout"]["margin"]["t"], 20);
    }

    #[test]
    fn test_figure_skips_missing_values() {
        let t = table(
            vec![Dimension::Gender, Dimension::City],
            vec![row(&["Female", "A"], 1.0), row(&["Male", "B"], 2.0)],
        );
        let fig = build_chart(ChartKind::Gender, &t, &colors()).to_figure();
        assert_eq!(fig["data"][0]["x"], json!(["Female"]));
        assert_eq!(fig["data"][1]["x"], json!(["Male"]));
        assert_eq!(fig["data"][1]["name"], "B");
        assert_eq!(fig["layout"]["barmode"], "group");
    }

    #[test]
    fn test_value_range_includes_zero() {
        let t = table(vec![Dimension::City], vec![row(&["A"], 3.0), row(&["B"], 7.0)]);
        let chart = build_chart(ChartKind::City, &t, &colors());
        assert_eq!(chart.value_range(), (0.0, 7.0));
    }

    #[test]
    fn test_chart_kind_from_str() {
        assert_eq!("city".parse::<ChartKind>().unwrap(), ChartKind::City);
        assert_eq!("pay_fig".parse::<ChartKind>().unwrap(), ChartKind::Payment);
        assert_eq!("date".parse::<ChartKind>().unwrap(), ChartKind::IncomeOverTime);
        assert!(matches!(
            "pie".parse::<ChartKind>(),
            Err(DashError::InvalidArgument(_))
        ));
    }
}
