use clap::Parser;
use sales_dashboard::{DashboardConfig, app};
use std::process::ExitCode;

/// Main entry point for the sales dashboard
///
/// Settings come from `SALES_DASHBOARD_*` environment variables; an optional
/// first argument overrides the data file path. The process exits non-zero
/// if the file cannot be loaded, before anything is served.
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::parse();

    log::info!("Starting sales dashboard with {}", config.data_path.display());
    match app::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
