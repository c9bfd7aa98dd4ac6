//! Daily price feed client
//!
//! Fetches a daily close series for a symbol from an AlphaVantage-style
//! endpoint, returning a chronologically ordered [`PriceSeries`] for the
//! contradiction analyzer.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use claimlens_core::{PricePoint, PriceSeries};

use crate::{create_http_client, NetConfig, RemoteError};

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)", default)]
    series: BTreeMap<String, DailyBar>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
}

/// Client for daily close series
pub struct PriceFeedClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PriceFeedClient {
    pub fn new(config: &NetConfig, api_key: Option<String>) -> Result<Self, RemoteError> {
        Ok(Self {
            client: create_http_client(config)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Fetch the recent daily closes for a symbol
    pub async fn daily_closes(&self, symbol: &str) -> Result<PriceSeries, RemoteError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RemoteError::MissingCredentials("price_feed_api_key"))?;
        if symbol.trim().is_empty() {
            return Err(RemoteError::InvalidInput("empty symbol".to_string()));
        }

        let url = format!(
            "{}?function=TIME_SERIES_DAILY&symbol={}&outputsize=compact&apikey={}",
            self.base_url,
            urlencoding::encode(symbol.trim()),
            api_key
        );
        debug!(%symbol, "fetching daily close series");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        let body: DailySeriesResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let series = parse_series(body);
        if series.is_empty() {
            return Err(RemoteError::Decode("empty price series".to_string()));
        }
        Ok(series)
    }
}

fn parse_series(body: DailySeriesResponse) -> PriceSeries {
    let points: Vec<PricePoint> = body
        .series
        .into_iter()
        .filter_map(|(date, bar)| {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()?;
            let close = bar.close.parse::<f64>().ok()?;
            Some(PricePoint { date, close })
        })
        .collect();
    PriceSeries::new(points)
}
