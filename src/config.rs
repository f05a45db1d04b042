use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "Adidas_US_Sales_Datasets.xlsx";
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_RETAILER: &str = "Walmart";
pub const DEFAULT_CHART_WIDTH: u32 = 640;
pub const DEFAULT_CHART_HEIGHT: u32 = 480;

/// Runtime settings for the dashboard server.
///
/// Every setting reads from a `SALES_DASHBOARD_*` environment variable; the
/// data file can also be given as the first argument.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "dashboard", version, about = "Serve the retail sales dashboard")]
pub struct DashboardConfig {
    /// Spreadsheet loaded at startup.
    #[arg(env = "SALES_DASHBOARD_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Address the HTTP server binds to.
    #[arg(long, env = "SALES_DASHBOARD_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: SocketAddr,

    /// Retailer selected when the request names none.
    #[arg(long = "retailer", env = "SALES_DASHBOARD_RETAILER", default_value = DEFAULT_RETAILER)]
    pub default_retailer: String,

    #[arg(
        long,
        env = "SALES_DASHBOARD_CHART_WIDTH",
        default_value_t = DEFAULT_CHART_WIDTH,
        value_parser = clap::value_parser!(u32).range(100..=4000)
    )]
    pub chart_width: u32,

    #[arg(
        long,
        env = "SALES_DASHBOARD_CHART_HEIGHT",
        default_value_t = DEFAULT_CHART_HEIGHT,
        value_parser = clap::value_parser!(u32).range(100..=4000)
    )]
    pub chart_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            default_retailer: DEFAULT_RETAILER.to_string(),
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }
}
