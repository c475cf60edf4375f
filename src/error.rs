// src/error.rs
use thiserror::Error;
use warp::http::StatusCode;
use warp::reject::Reject;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Failed to read symbol catalog {path}: {source}")]
    CatalogIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed symbol catalog {path}: {source}")]
    CatalogFormat {
        path: String,
        source: serde_json::Error,
    },
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("Request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        source: reqwest::Error,
    },
    #[error("Unexpected response from {service}: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::UnknownSymbol(_) => StatusCode::BAD_REQUEST,
            DashboardError::Transport { .. } | DashboardError::Decode { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Reject for DashboardError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_map_to_bad_gateway() {
        let err = DashboardError::Decode {
            service: "estimation",
            message: "missing field `r`".to_string(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.to_string(),
            "Unexpected response from estimation: missing field `r`"
        );
    }

    #[test]
    fn unknown_symbol_is_a_client_error() {
        let err = DashboardError::UnknownSymbol("ZZZ".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            DashboardError::Config("bad".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
