use crate::config::BROWSER_USER_AGENT;
use crate::error::{ConfigError, FetchError};
use crate::fetch::Fetch;
use crate::http::HttpClient;
use crate::source::TargetEntity;
use crate::transform::Transform;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Number, Value};
use tracing::{trace, warn};

// fetch
// ----------------------------------------------------------------------------

/// Yahoo Finance `v8/finance/chart`, one day of daily data per ticker; only `meta` is used.
pub struct ChartApi {
    client: HttpClient,
    base: String,
}

impl ChartApi {
    pub fn new(base: impl Into<String>) -> Result<Self, ConfigError> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base: base.into(),
        })
    }
}

#[async_trait]
impl Fetch for ChartApi {
    async fn fetch(&self, entity: &TargetEntity) -> Result<Value, FetchError> {
        let url = format!(
            "{base}/v8/finance/chart/{ticker}",
            base = self.base.trim_end_matches('/'),
            ticker = entity.id
        );

        // fetch raw http response
        let response = self
            .client
            .get(url)
            .query(&[
                ("region", "US"),
                ("lang", "en-US"),
                ("includePrePost", "false"),
                ("interval", "1d"),
                ("range", "1d"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        // deserialize the response to JSON
        let body = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&body)?;

        // the chart api reports its own errors inside an otherwise valid document
        if let Some(err) = payload.pointer("/chart/error").filter(|err| !err.is_null()) {
            let description = err
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("unknown chart error");
            return Err(FetchError::Api(description.to_string()));
        }

        Ok(payload)
    }
}

// transform
// ----------------------------------------------------------------------------

/// Market capitalization of one stock, as reported.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketCap {
    pub ticker: String,
    pub market_cap: u64,
    pub fetched_at: DateTime<Utc>,
}

impl std::fmt::Display for MarketCap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: Market Cap = ${:.1}B",
            self.ticker,
            self.market_cap as f64 / 1e9
        )
    }
}

/// Pulls `chart.result[0].meta.marketCap` out of a chart document.
///
/// Absent, null, non-positive and fractional caps are all rejected; accepted caps are
/// kept exactly as reported.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarketCapTransformer;

impl Transform for MarketCapTransformer {
    type Record = MarketCap;

    fn accept(&self, entity: &TargetEntity, payload: &Value) -> Option<MarketCap> {
        let response = match ChartResponse::deserialize(payload) {
            Ok(response) => response,
            Err(err) => {
                warn!("unexpected chart document for {entity}, error({err})");
                return None;
            }
        };

        let market_cap = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|result| result.meta.market_cap)
            .and_then(|cap| exact_positive(&cap));

        match market_cap {
            Some(market_cap) => Some(MarketCap {
                ticker: entity.id.clone(),
                market_cap,
                fetched_at: Utc::now(),
            }),
            None => {
                trace!("no market cap data for {entity}");
                None
            }
        }
    }
}

/// Positive integers, or floats carrying an integral value.
fn exact_positive(number: &Number) -> Option<u64> {
    if let Some(value) = number.as_u64() {
        return (value > 0).then_some(value);
    }
    if number.is_i64() {
        // negative
        return None;
    }

    let value = number.as_f64()?;
    let integral = value.is_finite() && value.fract() == 0.0;
    (integral && value > 0.0 && value < u64::MAX as f64).then_some(value as u64)
}

// de
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Meta,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(rename = "marketCap", default)]
    market_cap: Option<Number>,
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
