//! Pass-through proxy for NEPSE market data.

use anyhow::{bail, Context};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{instrument, warn};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct NepseQuery {
    pub symbol: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/nepse", get(nepse))
}

#[instrument(skip(state))]
pub async fn nepse(
    State(state): State<AppState>,
    Query(query): Query<NepseQuery>,
) -> Result<Json<Value>, ApiError> {
    fetch_market_data(
        &state.http,
        &state.config.market_data_url,
        query.symbol.as_deref(),
    )
    .await
    .map(Json)
    .map_err(|e| {
        warn!(error = %e, "market data fetch failed");
        ApiError::ExternalService {
            message: "Failed to fetch NEPSE data".into(),
            details: format!("{e:#}"),
        }
    })
}

/// `GET {url}?symbol=...` and the upstream JSON body as is.
pub async fn fetch_market_data(
    http: &reqwest::Client,
    url: &str,
    symbol: Option<&str>,
) -> anyhow::Result<Value> {
    if url.trim().is_empty() {
        bail!("MARKET_DATA_URL is not configured");
    }

    let mut request = http.get(url);
    if let Some(symbol) = symbol.map(str::trim).filter(|s| !s.is_empty()) {
        request = request.query(&[("symbol", symbol)]);
    }

    let body = request
        .send()
        .await
        .context("market data request")?
        .error_for_status()
        .context("market data response")?
        .json::<Value>()
        .await
        .context("market data body")?;
    Ok(body)
}
