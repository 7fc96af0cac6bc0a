// Update handler: selection state in, chart specifications out

use crate::aggregate::aggregate;
use crate::chart::{build_chart, build_charts, ChartKind, ChartSpec};
use crate::data::Dataset;
use crate::error::DashResult;
use crate::layout::Variant;
use crate::metric::Metric;
use crate::palette::{ColorMap, ColorPalette};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Current user selection driving every render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub cities: BTreeSet<String>,
    pub metric: Metric,
}

impl SelectionState {
    /// Every city selected, gross income as the metric
    pub fn initial(dataset: &Dataset) -> Self {
        Self {
            cities: dataset.cities_by_frequency().into_iter().collect(),
            metric: Metric::default(),
        }
    }

    /// Build a selection from raw request values, rejecting unknown metrics
    pub fn from_request<I, S>(cities: I, metric: &str) -> DashResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            cities: cities.into_iter().map(Into::into).collect(),
            metric: metric.parse()?,
        })
    }
}

/// Charts produced by one render, in layout order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedCharts {
    pub charts: Vec<ChartSpec>,
}

impl RenderedCharts {
    pub fn get(&self, kind: ChartKind) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

/// City colors keyed on the dataset's checklist order
pub fn city_colors(dataset: &Dataset) -> ColorMap {
    ColorPalette::category10().assign_colors(&dataset.cities_by_frequency())
}

/// Filter, aggregate and build every chart the variant shows
pub fn render(
    dataset: &Dataset,
    state: &SelectionState,
    variant: Variant,
    colors: &ColorMap,
) -> RenderedCharts {
    debug!(
        cities = state.cities.len(),
        metric = %state.metric,
        ?variant,
        "rendering charts"
    );

    let aggregates = aggregate(dataset.records(), &state.cities, state.metric);
    RenderedCharts {
        charts: build_charts(&variant.charts(), &aggregates, colors),
    }
}

/// Render a single chart regardless of which variant is on screen
pub fn render_chart(
    dataset: &Dataset,
    state: &SelectionState,
    kind: ChartKind,
    colors: &ColorMap,
) -> ChartSpec {
    debug!(chart = kind.id(), metric = %state.metric, "rendering single chart");

    let aggregates = aggregate(dataset.records(), &state.cities, state.metric);
    build_chart(kind, kind.table(&aggregates), colors)
}
