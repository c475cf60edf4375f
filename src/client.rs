// src/client.rs
use crate::config::ServiceConfig;
use crate::error::DashboardError;
use crate::models::{
    EstimationRequest, EstimationResult, MovingAverageRequest, MovingAverageResponse,
    PortfolioRequest, PortfolioResponse, PortfolioSeries, QueryOutcome, DATE_FORMAT,
};
use chrono::NaiveDate;
use log::{debug, error, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

const ESTIMATION: &str = "estimation service";
const PORTFOLIO: &str = "portfolio series service";
const MOVING_AVERAGE: &str = "moving-average plot service";

/// Talks to the three remote services. Cheap to clone; the connection
/// pool is shared.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    config: ServiceConfig,
}

impl ServiceClient {
    pub fn new(config: ServiceConfig) -> Result<Self, DashboardError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DashboardError::Config(format!("HTTP client: {}", e)))?;
        Ok(ServiceClient { client, config })
    }

    pub fn benchmark_index(&self) -> &str {
        &self.config.benchmark_index
    }

    /// Fires the three requests at once and waits for all of them. The
    /// first failure aborts the whole query.
    pub async fn run_query(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<QueryOutcome, DashboardError> {
        info!("Running query for {} from {} to {}", symbol, start, end);
        let (estimation, series, ma_plot_url) = tokio::try_join!(
            self.estimate(symbol, start, end, &self.config.benchmark_index),
            self.portfolio_series(symbol, start, end),
            self.moving_average_plot(symbol, start, end, &self.config.ma_windows, symbol),
        )?;
        info!(
            "Query for {} complete: {} series rows",
            symbol,
            series.rows.len()
        );
        Ok(QueryOutcome {
            estimation,
            series,
            ma_plot_url,
        })
    }

    pub async fn estimate(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        index: &str,
    ) -> Result<EstimationResult, DashboardError> {
        let payload = EstimationRequest {
            symbol,
            startdate: start.format(DATE_FORMAT).to_string(),
            enddate: end.format(DATE_FORMAT).to_string(),
            index,
        };
        let request = self.client.get(&self.config.estimate_url).json(&payload);
        send_json(ESTIMATION, request).await
    }

    pub async fn portfolio_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PortfolioSeries, DashboardError> {
        let mut components = HashMap::new();
        components.insert(symbol, 1);
        let payload = PortfolioRequest {
            startdate: start.format(DATE_FORMAT).to_string(),
            enddate: end.format(DATE_FORMAT).to_string(),
            components,
        };
        let body = serde_json::to_string(&payload).map_err(|e| DashboardError::Decode {
            service: PORTFOLIO,
            message: e.to_string(),
        })?;
        // This endpoint is fed a plain-text body.
        let request = self
            .client
            .get(&self.config.portfolio_url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body);
        let response: PortfolioResponse = send_json(PORTFOLIO, request).await?;
        Ok(response.into())
    }

    pub async fn moving_average_plot(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        windows: &[u32],
        title: &str,
    ) -> Result<String, DashboardError> {
        let payload = MovingAverageRequest {
            symbol,
            startdate: start.format(DATE_FORMAT).to_string(),
            enddate: end.format(DATE_FORMAT).to_string(),
            dayswindow: windows,
            title,
        };
        let request = self.client.get(&self.config.ma_plot_url).json(&payload);
        let response: MovingAverageResponse = send_json(MOVING_AVERAGE, request).await?;
        Ok(response.plot.url)
    }
}

// The status code is not checked: the services report failures in the body,
// and anything that does not decode is an error either way.
async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T, DashboardError> {
    let response = request.send().await.map_err(|source| {
        error!("HTTP request to {} failed: {}", service, source);
        DashboardError::Transport { service, source }
    })?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|source| DashboardError::Transport { service, source })?;
    debug!("{} answered HTTP {} ({} bytes)", service, status, text.len());

    serde_json::from_str(&text).map_err(|e| {
        error!("Failed to parse {} response: {}", service, e);
        DashboardError::Decode {
            service,
            message: format!("HTTP {}: {}", status, e),
        }
    })
}


#[cfg(test)]
mod tests {
    use super::mock::{broken_url, sample_estimation, spawn_services};
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn run_query_joins_all_three_services() {
        let (config, recorded) = spawn_services(sample_estimation());
        let client = ServiceClient::new(config).unwrap();

        let outcome = client
            .run_query("VOO", date(2021, 1, 6), date(2021, 2, 6))
            .await
            .unwrap();

        assert_eq!(outcome.estimation.r, 0.1);
        assert_eq!(outcome.estimation.beta, Some(1.1));
        assert_eq!(outcome.series.rows.len(), 2);
        assert_eq!(outcome.series.rows[1].value, 103.0);
        assert_eq!(
            outcome.series.spreadsheet_url,
            "https://plots.example/series.xlsx"
        );
        assert_eq!(outcome.ma_plot_url, "https://plots.example/ma.png");

        let mut calls = recorded.lock().unwrap().clone();
        calls.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0].1,
            json!({"symbol": "VOO", "startdate": "2021-01-06", "enddate": "2021-02-06", "index": "^GSPC"})
        );
        assert_eq!(
            calls[1].1,
            json!({"symbol": "VOO", "startdate": "2021-01-06", "enddate": "2021-02-06", "dayswindow": [50, 200], "title": "VOO"})
        );
        assert_eq!(calls[2].0, "portfolio text/plain");
        assert_eq!(
            calls[2].1,
            json!({"startdate": "2021-01-06", "enddate": "2021-02-06", "components": {"VOO": 1}})
        );
    }

    #[tokio::test]
    async fn missing_beta_is_not_an_error() {
        let (config, _) = spawn_services(
            json!({"r": 0.1, "vol": 0.2, "downside_risk": 0.05, "upside_risk": 0.08}),
        );
        let client = ServiceClient::new(config).unwrap();
        let outcome = client
            .run_query("AAPL", date(2021, 1, 6), date(2021, 2, 6))
            .await
            .unwrap();
        assert_eq!(outcome.estimation.beta, None);
    }

    #[tokio::test]
    async fn missing_key_aborts_the_query() {
        let (config, _) = spawn_services(json!({"vol": 0.2}));
        let client = ServiceClient::new(config).unwrap();
        let err = client
            .run_query("AAPL", date(2021, 1, 6), date(2021, 2, 6))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Decode {
                service: ESTIMATION,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn non_json_body_aborts_the_query() {
        let (mut config, _) = spawn_services(sample_estimation());
        config.ma_plot_url = broken_url(&config);
        let client = ServiceClient::new(config).unwrap();
        let err = client
            .run_query("AAPL", date(2021, 1, 6), date(2021, 2, 6))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Decode {
                service: MOVING_AVERAGE,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let (mut config, _) = spawn_services(sample_estimation());
        config.portfolio_url = "http://127.0.0.1:1/portfolio".to_string();
        let client = ServiceClient::new(config).unwrap();
        let err = client
            .portfolio_series("AAPL", date(2021, 1, 6), date(2021, 2, 6))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Transport { .. }));
    }

    #[tokio::test]
    async fn benchmark_index_is_configurable() {
        let (mut config, recorded) = spawn_services(sample_estimation());
        config.benchmark_index = "^IXIC".to_string();
        let client = ServiceClient::new(config).unwrap();
        assert_eq!(client.benchmark_index(), "^IXIC");
        client
            .run_query("AAPL", date(2021, 1, 6), date(2021, 2, 6))
            .await
            .unwrap();
        let calls = recorded.lock().unwrap();
        let estimate = calls.iter().find(|(name, _)| name == "estimate").unwrap();
        assert_eq!(estimate.1["index"], "^IXIC");
    }
}
