// src/api.rs
use crate::catalog::Catalog;
use crate::client::ServiceClient;
use crate::error::DashboardError;
use crate::models::{QueryParams, SymbolInfo};
use crate::render;
use chrono::{Local, NaiveDate};
use log::{error, info, warn};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub client: ServiceClient,
    pub default_start: NaiveDate,
}

pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(index_handler);

    let compute = warp::path!("compute")
        .and(warp::get())
        .and(warp::query::<QueryParams>())
        .and(with_state(state.clone()))
        .and_then(compute_handler);

    let catalog = warp::path!("api" / "catalog")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(catalog_handler);

    let query = warp::path!("api" / "query")
        .and(warp::get())
        .and(warp::query::<QueryParams>())
        .and(with_state(state))
        .and_then(query_handler);

    index
        .or(compute)
        .or(catalog)
        .or(query)
        .recover(handle_rejection)
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn index_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let sidebar = render::sidebar(&state.catalog, None, state.default_start, today());
    Ok(warp::reply::html(render::page(&sidebar, "")))
}

fn lookup<'a>(state: &'a AppState, symbol: &str) -> Result<&'a SymbolInfo, DashboardError> {
    state
        .catalog
        .get(symbol)
        .ok_or_else(|| DashboardError::UnknownSymbol(symbol.to_string()))
}

async fn compute_handler(
    params: QueryParams,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let info = match lookup(&state, &params.symbol) {
        Ok(info) => info,
        Err(e) => {
            warn!("Rejected query: {}", e);
            return Err(warp::reject::custom(e));
        }
    };

    match state
        .client
        .run_query(&params.symbol, params.startdate, params.enddate)
        .await
    {
        Ok(outcome) => {
            info!("Rendered results for {}", params.symbol);
            let sidebar = render::sidebar(
                &state.catalog,
                Some(params.symbol.as_str()),
                params.startdate,
                params.enddate,
            );
            let content = render::results(
                &outcome,
                &params.symbol,
                &info.description,
                state.client.benchmark_index(),
            );
            Ok(warp::reply::html(render::page(&sidebar, &content)))
        }
        Err(e) => {
            error!("Query for {} failed: {}", params.symbol, e);
            Err(warp::reject::custom(e))
        }
    }
}

async fn catalog_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&state.catalog.ordered()))
}

async fn query_handler(
    params: QueryParams,
    state: Arc<AppState>,
) -> Result<Response, Rejection> {
    let result = match lookup(&state, &params.symbol) {
        Ok(_) => {
            state
                .client
                .run_query(&params.symbol, params.startdate, params.enddate)
                .await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(outcome) => Ok(warp::reply::json(&outcome).into_response()),
        Err(e) => {
            error!("Query for {} failed: {}", params.symbol, e);
            let body = json!({ "error": e.to_string() });
            Ok(warp::reply::with_status(warp::reply::json(&body), e.status()).into_response())
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<DashboardError>() {
        (e.status(), e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };
    let sidebar = r#"<aside><h1>Symbols</h1><p><a href="/">Back</a></p></aside>"#;
    let html = render::page(sidebar, &render::error_message(&message));
    Ok(warp::reply::with_status(warp::reply::html(html), status))
}
