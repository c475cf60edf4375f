// src/main.rs
mod api;
mod catalog;
mod chart;
mod client;
mod config;
mod error;
mod models;
mod render;

use crate::api::AppState;
use crate::client::ServiceClient;
use crate::config::Config;
use env_logger::{Builder, Env};
use log::{error, info, warn};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    // The catalog is required; without it there is nothing to select.
    let catalog = match catalog::load_catalog(&config.catalog_path) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    if catalog.is_empty() {
        warn!("Symbol catalog {} is empty", config.catalog_path);
    }

    let client = match ServiceClient::new(config.services.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    info!(
        "Remote services: estimate={} portfolio={} moving-average={}",
        config.services.estimate_url, config.services.portfolio_url, config.services.ma_plot_url
    );

    let state = Arc::new(AppState {
        catalog,
        client,
        default_start: config.default_start_date,
    });
    let routes = api::routes(state);

    info!("Dashboard running on http://{}", config.bind_addr);
    warp::serve(routes).run(config.bind_addr).await;
}
