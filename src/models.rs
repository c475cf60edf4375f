// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts a continuously compounded return to a simple one.
pub fn convert_expreturn_to_annualreturn(r: f64) -> f64 {
    r.exp() - 1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolInfo {
    pub symbol: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimationResult {
    pub r: f64,
    pub vol: f64,
    pub downside_risk: f64,
    pub upside_risk: f64,
    #[serde(default)]
    pub beta: Option<f64>,
}

impl EstimationResult {
    pub fn annual_return(&self) -> f64 {
        convert_expreturn_to_annualreturn(self.r)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesRow {
    #[serde(
        rename = "TimeStamp",
        alias = "timestamp",
        deserialize_with = "date_prefix"
    )]
    pub timestamp: NaiveDate,
    pub stock_value: f64,
    pub value: f64,
}

// Accepts "2021-01-06" as well as "2021-01-06T00:00:00" style values.
fn date_prefix<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let head = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(head, DATE_FORMAT).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortfolioSeries {
    pub rows: Vec<SeriesRow>,
    pub plot_url: String,
    pub spreadsheet_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub estimation: EstimationResult,
    pub series: PortfolioSeries,
    pub ma_plot_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    pub symbol: String,
    pub startdate: NaiveDate,
    pub enddate: NaiveDate,
}

// Request bodies sent to the remote services.

#[derive(Debug, Serialize)]
pub struct EstimationRequest<'a> {
    pub symbol: &'a str,
    pub startdate: String,
    pub enddate: String,
    pub index: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PortfolioRequest<'a> {
    pub startdate: String,
    pub enddate: String,
    pub components: HashMap<&'a str, u32>,
}

#[derive(Debug, Serialize)]
pub struct MovingAverageRequest<'a> {
    pub symbol: &'a str,
    pub startdate: String,
    pub enddate: String,
    pub dayswindow: &'a [u32],
    pub title: &'a str,
}

// Response bodies.

#[derive(Debug, Deserialize)]
pub struct PlotLink {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioResponse {
    pub data: Vec<SeriesRow>,
    pub plot: PlotLink,
    pub spreadsheet: PlotLink,
}

impl From<PortfolioResponse> for PortfolioSeries {
    fn from(resp: PortfolioResponse) -> Self {
        PortfolioSeries {
            rows: resp.data,
            plot_url: resp.plot.url,
            spreadsheet_url: resp.spreadsheet.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MovingAverageResponse {
    pub plot: PlotLink,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn annual_return_of_zero_is_zero() {
        assert_eq!(convert_expreturn_to_annualreturn(0.0), 0.0);
    }

    #[test]
    fn annual_return_of_ln2_doubles() {
        let annual = convert_expreturn_to_annualreturn(2f64.ln());
        assert!((annual - 1.0).abs() < 1e-12);
    }

    #[test]
    fn beta_missing_or_null_is_none() {
        let missing: EstimationResult = serde_json::from_value(json!({
            "r": 0.1, "vol": 0.2, "downside_risk": 0.05, "upside_risk": 0.08
        }))
        .unwrap();
        assert_eq!(missing.beta, None);

        let null: EstimationResult = serde_json::from_value(json!({
            "r": 0.1, "vol": 0.2, "downside_risk": 0.05, "upside_risk": 0.08, "beta": null
        }))
        .unwrap();
        assert_eq!(null.beta, None);
    }

    #[test]
    fn estimation_requires_return_fields() {
        let res = serde_json::from_value::<EstimationResult>(json!({"vol": 0.2}));
        assert!(res.is_err());
    }

    #[test]
    fn series_row_keeps_date_part_of_timestamp() {
        let row: SeriesRow = serde_json::from_value(json!({
            "TimeStamp": "2021-01-06T00:00:00",
            "stock_value": 100.0,
            "value": 101.5
        }))
        .unwrap();
        assert_eq!(row.timestamp, NaiveDate::from_ymd_opt(2021, 1, 6).unwrap());

        let lower: SeriesRow = serde_json::from_value(json!({
            "timestamp": "2021-01-07", "stock_value": 1.0, "value": 2.0
        }))
        .unwrap();
        assert_eq!(lower.timestamp, NaiveDate::from_ymd_opt(2021, 1, 7).unwrap());
    }

    #[test]
    fn portfolio_response_flattens_urls() {
        let resp: PortfolioResponse = serde_json::from_value(json!({
            "data": [{"TimeStamp": "2021-01-06", "stock_value": 1.0, "value": 1.0}],
            "plot": {"url": "https://plots/a.png"},
            "spreadsheet": {"url": "https://sheets/a.xlsx"}
        }))
        .unwrap();
        let series = PortfolioSeries::from(resp);
        assert_eq!(series.rows.len(), 1);
        assert_eq!(series.plot_url, "https://plots/a.png");
        assert_eq!(series.spreadsheet_url, "https://sheets/a.xlsx");
    }

    #[test]
    fn portfolio_request_uses_unit_weight() {
        let mut components = HashMap::new();
        components.insert("VOO", 1);
        let body = serde_json::to_value(PortfolioRequest {
            startdate: "2021-01-06".to_string(),
            enddate: "2021-02-06".to_string(),
            components,
        })
        .unwrap();
        assert_eq!(body["components"], json!({"VOO": 1}));
    }
}
