// src/config.rs
use crate::error::DashboardError;
use crate::models::DATE_FORMAT;
use chrono::NaiveDate;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const ESTIMATE_URL: &str =
    "https://1phrvfsc16.execute-api.us-east-1.amazonaws.com/default/fininfoestimate";
const PORTFOLIO_URL: &str =
    "https://ed0lbq7vph.execute-api.us-east-1.amazonaws.com/default/finportplot";
const MA_PLOT_URL: &str =
    "https://vwl0qcnnve.execute-api.us-east-1.amazonaws.com/default/finport-ma-plot";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub estimate_url: String,
    pub portfolio_url: String,
    pub ma_plot_url: String,
    pub benchmark_index: String,
    pub ma_windows: Vec<u32>,
    pub request_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            estimate_url: ESTIMATE_URL.to_string(),
            portfolio_url: PORTFOLIO_URL.to_string(),
            ma_plot_url: MA_PLOT_URL.to_string(),
            benchmark_index: "^GSPC".to_string(),
            ma_windows: vec![50, 200],
            request_timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub catalog_path: String,
    pub default_start_date: NaiveDate,
    pub services: ServiceConfig,
}

impl Config {
    /// Reads `FININFO_*` variables, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, DashboardError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let bind_addr = lookup("FININFO_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3030".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| DashboardError::Config(format!("FININFO_BIND_ADDR: {}", e)))?;

        let default_start_date = match lookup("FININFO_DEFAULT_START_DATE") {
            Some(raw) => NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
                DashboardError::Config(format!("FININFO_DEFAULT_START_DATE: {}", e))
            })?,
            None => NaiveDate::from_ymd_opt(2021, 1, 6)
                .ok_or_else(|| DashboardError::Config("invalid default start date".into()))?,
        };

        let ma_windows = match lookup("FININFO_MA_WINDOWS") {
            Some(raw) => parse_windows(&raw)?,
            None => defaults.ma_windows,
        };

        let request_timeout = match lookup("FININFO_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.trim().parse().map_err(|e| {
                DashboardError::Config(format!("FININFO_REQUEST_TIMEOUT_SECS: {}", e))
            })?)),
            None => None,
        };

        Ok(Config {
            bind_addr,
            catalog_path: lookup("FININFO_CATALOG_PATH")
                .unwrap_or_else(|| "allsymdf.json".to_string()),
            default_start_date,
            services: ServiceConfig {
                estimate_url: lookup("FININFO_ESTIMATE_URL").unwrap_or(defaults.estimate_url),
                portfolio_url: lookup("FININFO_PORTFOLIO_URL").unwrap_or(defaults.portfolio_url),
                ma_plot_url: lookup("FININFO_MA_PLOT_URL").unwrap_or(defaults.ma_plot_url),
                benchmark_index: lookup("FININFO_BENCHMARK_INDEX")
                    .unwrap_or(defaults.benchmark_index),
                ma_windows,
                request_timeout,
            },
        })
    }
}

fn parse_windows(raw: &str) -> Result<Vec<u32>, DashboardError> {
    let windows = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|e| DashboardError::Config(format!("FININFO_MA_WINDOWS: {}: {}", s, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if windows.is_empty() {
        return Err(DashboardError::Config(
            "FININFO_MA_WINDOWS: at least one window is required".to_string(),
        ));
    }
    Ok(windows)
}
