// Library exports for salesdash

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod layout;
pub mod metric;
pub mod palette;
pub mod render;
pub mod server;

use serde::Deserialize;

pub use data::Dataset;
pub use error::{DashError, DashResult};
pub use layout::Variant;
pub use metric::Metric;
pub use render::{render, SelectionState};

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
        }
    }
}

/// Size and encoding of a statically rendered chart.
/// `height` falls back to the chart's own layout height.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: None,
            format: OutputFormat::Png,
        }
    }
}
