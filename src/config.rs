use crate::chart::ChartKind;
use crate::error::DashResult;
use crate::layout::Variant;
use crate::metric::Metric;
use crate::{OutputFormat, RenderOptions};
use clap::{Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "./data/supermarket_sales.csv";
pub const DEFAULT_ASSETS_DIR: &str = "./assets";
pub const DEFAULT_PORT: u16 = 8050;

#[derive(Parser, Debug)]
#[command(name = "salesdash")]
#[command(about = "Sales dashboard: filter by city, aggregate a metric, draw bar charts", long_about = None)]
pub struct Args {
    /// Sales CSV to load at startup
    #[arg(long, global = true, default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Chart set to show: full or simple
    #[arg(long, global = true, default_value = "full")]
    pub variant: Variant,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the dashboard over HTTP (default)
    Serve(ServeArgs),
    /// Render one chart to stdout as PNG or SVG
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory holding the logo and other static files
    #[arg(long, default_value = DEFAULT_ASSETS_DIR)]
    pub assets: PathBuf,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            assets: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// city, gender, payment, date or product
    #[arg(long)]
    pub chart: String,

    #[arg(long, default_value = "gross income")]
    pub metric: String,

    /// City to include; repeat for several. Omit to include every city.
    #[arg(long = "city")]
    pub cities: Vec<String>,

    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Defaults to the chart's own height
    #[arg(long)]
    pub height: Option<u32>,

    /// png or svg
    #[arg(long, default_value = "png", value_parser = parse_format)]
    pub format: OutputFormat,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s {
        "png" => Ok(OutputFormat::Png),
        "svg" => Ok(OutputFormat::Svg),
        other => Err(format!("unknown format '{}' (expected png or svg)", other)),
    }
}

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub data_path: PathBuf,
    pub variant: Variant,
    pub addr: SocketAddr,
    pub assets_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub data_path: PathBuf,
    pub chart: ChartKind,
    pub metric: Metric,
    /// Empty means every city in the dataset
    pub cities: Vec<String>,
    pub options: RenderOptions,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Serve(ServeConfig),
    Export(ExportConfig),
}

impl Args {
    /// Resolve CLI arguments into a run mode, validating chart and metric names
    pub fn into_mode(self) -> DashResult<Mode> {
        let mode = match self.command {
            None => Mode::Serve(serve_config(self.data, self.variant, ServeArgs::default())),
            Some(Command::Serve(args)) => Mode::Serve(serve_config(self.data, self.variant, args)),
            Some(Command::Export(args)) => Mode::Export(ExportConfig {
                data_path: self.data,
                chart: args.chart.parse()?,
                metric: args.metric.parse()?,
                cities: args.cities,
                options: RenderOptions {
                    width: args.width,
                    height: args.height,
                    format: args.format,
                },
            }),
        };
        Ok(mode)
    }
}

fn serve_config(data_path: PathBuf, variant: Variant, args: ServeArgs) -> ServeConfig {
    ServeConfig {
        data_path,
        variant,
        addr: SocketAddr::new(args.host, args.port),
        assets_dir: args.assets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashError;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("salesdash").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_serve_on_8050() {
        match parse(&[]).into_mode().unwrap() {
            Mode::Serve(cfg) => {
                assert_eq!(cfg.addr, "127.0.0.1:8050".parse::<SocketAddr>().unwrap());
                assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
                assert_eq!(cfg.variant, Variant::Full);
                assert_eq!(cfg.assets_dir, PathBuf::from(DEFAULT_ASSETS_DIR));
            }
            other => panic!("expected serve mode, got {:?}", other),
        }
    }

    #[test]
    fn test_serve_overrides() {
        let args = parse(&["--variant", "simple", "serve", "--port", "9000", "--host", "0.0.0.0"]);
        match args.into_mode().unwrap() {
            Mode::Serve(cfg) => {
                assert_eq!(cfg.addr.port(), 9000);
                assert!(cfg.addr.ip().is_unspecified());
                assert_eq!(cfg.variant, Variant::Simple);
            }
            other => panic!("expected serve mode, got {:?}", other),
        }
    }

    #[test]
    fn test_export_args() {
        let args = parse(&[
            "export", "--chart", "payment", "--metric", "Rating", "--city", "Yangon", "--city",
            "Mandalay", "--format", "svg", "--data", "other.csv",
        ]);
        match args.into_mode().unwrap() {
            Mode::Export(cfg) => {
                assert_eq!(cfg.chart, ChartKind::Payment);
                assert_eq!(cfg.metric, Metric::Rating);
                assert_eq!(cfg.cities, vec!["Yangon", "Mandalay"]);
                assert_eq!(cfg.options.format, OutputFormat::Svg);
                assert_eq!(cfg.options.height, None);
                assert_eq!(cfg.data_path, PathBuf::from("other.csv"));
            }
            other => panic!("expected export mode, got {:?}", other),
        }
    }

    #[test]
    fn test_export_accepts_variant_flag() {
        // The variant only shapes the served page; a single-chart export is unaffected
        let args = parse(&["--variant", "simple", "export", "--chart", "gender"]);
        match args.into_mode().unwrap() {
            Mode::Export(cfg) => {
                assert_eq!(cfg.chart, ChartKind::Gender);
                assert_eq!(cfg.metric, Metric::GrossIncome);
                assert!(cfg.cities.is_empty());
            }
            other => panic!("expected export mode, got {:?}", other),
        }
    }

    #[test]
    fn test_export_rejects_unknown_metric() {
        let args = parse(&["export", "--chart", "city", "--metric", "Quantity"]);
        assert!(matches!(args.into_mode(), Err(DashError::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_variant_rejected_by_parser() {
        let result = Args::try_parse_from(["salesdash", "--variant", "tiny"]);
        assert!(result.is_err());
    }
}
