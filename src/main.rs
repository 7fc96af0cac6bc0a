use anyhow::{Context, Result};
use clap::Parser;
use salesdash::config::{Args, ExportConfig, Mode};
use salesdash::graph::Canvas;
use salesdash::render::{city_colors, render_chart};
use salesdash::{Dataset, SelectionState};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let mode = Args::parse().into_mode()?;

    match mode {
        Mode::Serve(config) => {
            let dataset = load_dataset(&config.data_path)?;
            salesdash::server::serve(&config, Arc::new(dataset)).await
        }
        Mode::Export(config) => {
            let dataset = load_dataset(&config.data_path)?;
            export_chart(&config, &dataset)
        }
    }
}

/// Load the dataset up front; a bad file stops the process before anything is served
fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset = Dataset::load(path)
        .with_context(|| format!("Failed to load sales data from {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = dataset.len(),
        cities = dataset.cities_by_frequency().len(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn export_chart(config: &ExportConfig, dataset: &Dataset) -> Result<()> {
    let selection = if config.cities.is_empty() {
        SelectionState {
            metric: config.metric,
            ..SelectionState::initial(dataset)
        }
    } else {
        SelectionState {
            cities: config.cities.iter().cloned().collect(),
            metric: config.metric,
        }
    };

    let spec = render_chart(dataset, &selection, config.chart, &city_colors(dataset));
    let bytes = Canvas::new(&config.options, &spec)
        .render(&spec)
        .context("Failed to render chart")?;

    // Write image to stdout
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(&bytes)
        .context("Failed to write image to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
