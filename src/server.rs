//! HTTP boundary for the dashboard.
//!
//! Serves one page plus a small JSON API. The page asks `/api/layout` for its
//! controls and posts every selection change to `/api/render`. Each request carries
//! a sequence number that the response echoes back, so the page can drop any
//! response older than the latest request it sent.

use crate::chart::ChartKind;
use crate::config::ServeConfig;
use crate::data::Dataset;
use crate::error::{DashError, DashResult};
use crate::graph::{check_canvas_size, Canvas};
use crate::layout::{Layout, Variant};
use crate::palette::ColorMap;
use crate::render::{city_colors, render, render_chart, SelectionState};
use crate::{OutputFormat, RenderOptions};
use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// Shared, read-only server state
#[derive(Clone)]
pub struct AppState {
    dataset: Arc<Dataset>,
    variant: Variant,
    colors: Arc<ColorMap>,
    layout: Arc<Layout>,
    assets_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, variant: Variant, assets_dir: PathBuf) -> Self {
        let colors = Arc::new(city_colors(&dataset));
        let layout = Arc::new(Layout::build(&dataset, variant));
        Self {
            dataset,
            variant,
            colors,
            layout,
            assets_dir: Arc::new(assets_dir),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub cities: Vec<String>,
    pub metric: String,
    #[serde(default)]
    pub seq: u64,
}

#[derive(Debug, Serialize)]
pub struct ChartFigure {
    pub id: &'static str,
    pub figure: Value,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub seq: u64,
    pub charts: Vec<ChartFigure>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Comma separated; absent means every city, empty means none
    pub cities: Option<String>,
    pub metric: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "type")]
    pub format: Option<String>,
}

/// Error surfaced to HTTP clients
pub enum ApiError {
    Dash(DashError),
    Render(anyhow::Error),
}

impl From<DashError> for ApiError {
    fn from(e: DashError) -> Self {
        ApiError::Dash(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Dash(e @ DashError::InvalidArgument(_)) => {
                warn!(error = %e, "rejected request");
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            ApiError::Dash(e) => {
                warn!(error = %e, "request failed");
                (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
            }
            ApiError::Render(e) => {
                warn!(error = %e, "chart rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)).into_response()
            }
        }
    }
}

/// Pure part of the `/api/render` endpoint
pub fn handle_render(state: &AppState, request: RenderRequest) -> DashResult<RenderResponse> {
    let selection = SelectionState::from_request(request.cities, &request.metric)?;
    let rendered = render(&state.dataset, &selection, state.variant, &state.colors);

    Ok(RenderResponse {
        seq: request.seq,
        charts: rendered
            .charts
            .iter()
            .map(|spec| ChartFigure {
                id: spec.kind.id(),
                figure: spec.to_figure(),
            })
            .collect(),
    })
}

/// Pure part of the `/api/chart/:name` endpoint. Returns the content type and bytes.
pub fn handle_chart_image(
    state: &AppState,
    name: &str,
    query: ChartQuery,
) -> Result<(&'static str, Vec<u8>), ApiError> {
    let kind: ChartKind = name.parse()?;
    let metric = query.metric.as_deref().unwrap_or("gross income");
    let selection = match query.cities.as_deref() {
        None => SelectionState {
            metric: metric.parse()?,
            ..SelectionState::initial(&state.dataset)
        },
        Some(list) => SelectionState::from_request(parse_city_list(list), metric)?,
    };

    let format = match query.format.as_deref() {
        None | Some("png") => OutputFormat::Png,
        Some("svg") => OutputFormat::Svg,
        Some(other) => {
            return Err(DashError::InvalidArgument(format!("unknown image type '{}'", other)).into())
        }
    };
    let options = RenderOptions {
        width: query.width.unwrap_or_else(|| RenderOptions::default().width),
        height: query.height,
        format,
    };

    let spec = render_chart(&state.dataset, &selection, kind, &state.colors);
    check_canvas_size(options.width, options.height.unwrap_or(spec.layout.height))?;
    let bytes = Canvas::new(&options, &spec)
        .render(&spec)
        .map_err(ApiError::Render)?;
    Ok((options.format.content_type(), bytes))
}

fn parse_city_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn layout_handler(State(state): State<AppState>) -> Json<Layout> {
    Json(state.layout.as_ref().clone())
}

async fn render_handler(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, ApiError> {
    Ok(Json(handle_render(&state, request)?))
}

async fn chart_image_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Response, ApiError> {
    let (content_type, bytes) = handle_chart_image(&state, &name, query)?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(state.assets_dir.as_path());
    Router::new()
        .route("/", get(index_handler))
        .route("/api/layout", get(layout_handler))
        .route("/api/render", post(render_handler))
        .route("/api/chart/:name", get(chart_image_handler))
        .nest_service("/assets", assets)
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped
pub async fn serve(config: &ServeConfig, dataset: Arc<Dataset>) -> anyhow::Result<()> {
    let logo = config.assets_dir.join("logo.svg");
    if !logo.exists() {
        warn!(path = %logo.display(), "logo asset missing; page will show a broken image");
    }

    let state = AppState::new(dataset, config.variant, config.assets_dir.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!(addr = %config.addr, variant = ?config.variant, "dashboard listening on http://{}", config.addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sales Dashboard</title>
    <script src="https://cdn.plot.ly/plotly-2.27.0.min.js"></script>
    <style>
        * { box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; }
        .page { display: flex; }
        .sidebar { width: 17%; min-width: 180px; height: 90vh; margin: 20px; padding: 20px;
                   border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.15); }
        .sidebar img { display: block; margin: 0 auto 20px auto; }
        .sidebar label { display: block; margin-left: 20px; }
        .sidebar input { margin-right: 5px; }
        .charts { flex: 1; }
        .row { display: flex; }
        .row > div { flex: 1; padding: 0; }
    </style>
</head>
<body>
<div class="page">
    <div class="sidebar" id="sidebar"></div>
    <div class="charts" id="charts"></div>
</div>
<script>
let latestSeq = 0;

function selection() {
    const cities = [...document.querySelectorAll('input[name="check_city"]:checked')].map(e => e.value);
    const metric = document.querySelector('input[name="main_variable"]:checked').value;
    return { cities, metric };
}

async function update() {
    const seq = ++latestSeq;
    const res = await fetch('/api/render', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ ...selection(), seq }),
    });
    if (!res.ok) { console.error(await res.text()); return; }
    const body = await res.json();
    if (body.seq !== latestSeq) return;
    for (const chart of body.charts) {
        Plotly.react(chart.id, chart.figure.data, chart.figure.layout, { displayModeBar: false });
    }
}

function control(type, name, value, checked) {
    const label = document.createElement('label');
    const input = document.createElement('input');
    input.type = type; input.name = name; input.value = value; input.checked = checked;
    input.addEventListener('change', update);
    label.append(input, value);
    return label;
}

async function init() {
    const layout = await (await fetch('/api/layout')).json();
    const sidebar = document.getElementById('sidebar');

    const logo = document.createElement('img');
    logo.src = layout.logo.src; logo.width = layout.logo.width; logo.height = layout.logo.height;
    sidebar.append(logo);

    const cl = layout.city_checklist;
    const h1 = document.createElement('h5'); h1.textContent = cl.label; sidebar.append(h1);
    for (const city of cl.options) sidebar.append(control('checkbox', cl.id, city, cl.selected.includes(city)));

    const mc = layout.metric_choice;
    const h2 = document.createElement('h5'); h2.textContent = mc.label; sidebar.append(h2);
    for (const m of mc.options) sidebar.append(control('radio', mc.id, m, m === mc.selected));

    const charts = document.getElementById('charts');
    for (const row of layout.chart_rows) {
        const rowDiv = document.createElement('div'); rowDiv.className = 'row';
        for (const slot of row) {
            const div = document.createElement('div'); div.id = slot.id; div.style.height = slot.height + 'px';
            rowDiv.append(div);
        }
        charts.append(rowDiv);
    }
    update();
}

init();
</script>
</body>
</html>
"##;
