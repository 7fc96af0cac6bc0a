use crate::chart::{ChartSpec, Orientation};
use crate::error::{DashError, DashResult};
use crate::palette::parse_hex;
use crate::{OutputFormat, RenderOptions};
use anyhow::{anyhow, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

/// Fraction of each category slot covered by bars
const BAR_SPAN: f64 = 0.8;
/// Most category labels drawn on one axis
const MAX_CATEGORY_LABELS: usize = 12;
/// Largest width or height a canvas may have
pub const MAX_CANVAS_SIDE: u32 = 4096;

/// Reject canvas sizes that are zero or larger than `MAX_CANVAS_SIDE`
pub fn check_canvas_size(width: u32, height: u32) -> DashResult<()> {
    if width == 0 || height == 0 {
        return Err(DashError::InvalidArgument(format!(
            "canvas size must be non-zero (got {}x{})",
            width, height
        )));
    }
    if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
        return Err(DashError::InvalidArgument(format!(
            "canvas size {}x{} exceeds {}x{}",
            width, height, MAX_CANVAS_SIDE, MAX_CANVAS_SIDE
        )));
    }
    Ok(())
}

/// Canvas for drawing one chart specification to an image
pub struct Canvas {
    width: u32,
    height: u32,
    format: OutputFormat,
}

impl Canvas {
    /// Size the canvas from the render options, falling back to the chart's own height
    pub fn new(options: &RenderOptions, spec: &ChartSpec) -> Self {
        Canvas {
            width: options.width,
            height: options.height.unwrap_or(spec.layout.height),
            format: options.format.clone(),
        }
    }

    /// Draw the chart and encode it in the canvas format
    pub fn render(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        check_canvas_size(self.width, self.height)?;

        match self.format {
            OutputFormat::Png => self.render_png(spec),
            OutputFormat::Svg => self.render_svg(spec),
        }
    }

    fn render_png(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        let len = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| anyhow!("Canvas size {}x{} overflows", self.width, self.height))?;
        let mut buffer = vec![0u8; len];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            draw_chart(&root, spec)?;
            root.present().context("Failed to present drawing")?;
        }

        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&buffer, self.width, self.height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
        }

        Ok(png_bytes)
    }

    fn render_svg(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            draw_chart(&root, spec)?;
            root.present().context("Failed to present drawing")?;
        }
        Ok(svg.into_bytes())
    }
}

/// Draw axes, bars and (for split charts) a legend. Empty charts get axes only.
fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<()> {
    root.fill(&WHITE)
        .map_err(|e| anyhow!("Failed to fill background: {}", e))?;

    let num_categories = spec.categories.len();
    let category_range = 0.0..(num_categories.max(1) as f64);
    let value_range = padded_range(spec.value_range());
    let label_count = num_categories.clamp(1, MAX_CATEGORY_LABELS);
    let category_label = |v: &f64| {
        let idx = v.floor() as usize;
        spec.categories.get(idx).cloned().unwrap_or_default()
    };

    let horizontal = spec.orientation == Orientation::Horizontal;
    let (x_range, y_range) = if horizontal {
        (value_range, category_range)
    } else {
        (category_range, value_range)
    };

    let mut chart = ChartBuilder::on(root)
        .margin(5)
        .caption(&spec.title, ("sans-serif", 16))
        .x_label_area_size(30)
        .y_label_area_size(if horizontal { 120 } else { 50 })
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| anyhow!("Failed to build chart: {}", e))?;

    {
        let mut mesh = chart.configure_mesh();
        if horizontal {
            mesh.disable_y_mesh()
                .y_labels(label_count)
                .y_label_formatter(&category_label)
                .x_desc(spec.value_label.as_str())
                .y_desc(spec.category_label.as_str());
        } else {
            mesh.disable_x_mesh()
                .x_labels(label_count)
                .x_label_formatter(&category_label)
                .x_desc(spec.category_label.as_str())
                .y_desc(spec.value_label.as_str());
        }
        mesh.draw().map_err(|e| anyhow!("Failed to draw mesh: {}", e))?;
    }

    // Dodge series side by side inside each category slot
    let num_series = spec.series.len();
    let bar_width = BAR_SPAN / num_series.max(1) as f64;

    for (series_idx, series) in spec.series.iter().enumerate() {
        let color = parse_hex(&series.color);
        let offset = (series_idx as f64 - (num_series as f64 - 1.0) / 2.0) * bar_width;

        let bars = series
            .values
            .iter()
            .enumerate()
            .filter_map(|(cat_idx, v)| v.map(|v| (cat_idx, v)))
            .map(|(cat_idx, value)| {
                let center = cat_idx as f64 + 0.5 + offset;
                let (lo, hi) = (center - bar_width / 2.0, center + bar_width / 2.0);
                let corners = if horizontal {
                    [(0.0, lo), (value, hi)]
                } else {
                    [(lo, 0.0), (hi, value)]
                };
                Rectangle::new(corners, color.filled())
            });

        let drawn = chart
            .draw_series(bars)
            .map_err(|e| anyhow!("Failed to draw bars: {}", e))?;

        if let Some(name) = &series.name {
            drawn
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }
    }

    if spec.series.iter().any(|s| s.name.is_some()) {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| anyhow!("Failed to draw legend: {}", e))?;
    }

    Ok(())
}

/// Pad the value range by 5% on the side(s) away from zero
fn padded_range((min, max): (f64, f64)) -> Range<f64> {
    let padding = (max - min) * 0.05;
    let lo = if min < 0.0 { min - padding } else { min };
    let hi = if max > 0.0 { max + padding } else { max };
    lo..hi
}
