#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::PoolError;
use scout_spider::stock::holdings::{HoldingsTable, RowWrite};
use scout_spider::stock::yahoo_finance::MarketCap;
use scout_spider::{Clock, Fetch, FetchError, StoreError, TargetEntity};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Clock that only moves when slept on; records every sleep.
#[derive(Clone)]
pub struct ManualClock {
    start: Instant,
    offset: Arc<Mutex<Duration>>,
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
            sleeps: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.offset.lock().unwrap() += duration;
    }
}

/// Canned responses per entity id; unknown ids fail.
#[derive(Clone, Default)]
pub struct ScriptedFetch {
    responses: HashMap<String, Result<Value, String>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, id: &str, payload: Value) -> Self {
        self.responses.insert(id.to_string(), Ok(payload));
        self
    }

    pub fn err(mut self, id: &str, reason: &str) -> Self {
        self.responses.insert(id.to_string(), Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    async fn fetch(&self, entity: &TargetEntity) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(entity.id.clone());
        match self.responses.get(&entity.id) {
            Some(Ok(payload)) => Ok(payload.clone()),
            Some(Err(reason)) => Err(FetchError::Api(reason.clone())),
            None => Err(FetchError::Api(format!("no response scripted for {}", entity.id))),
        }
    }
}

/// A chart document carrying `marketCap`.
pub fn chart(market_cap: Value) -> Value {
    serde_json::json!({
        "chart": {
            "result": [{ "meta": { "currency": "USD", "marketCap": market_cap } }],
            "error": null
        }
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoldingRow {
    pub etf: String,
    pub stock: String,
    pub market_cap: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// In-memory `etfHoldings`.
#[derive(Default)]
pub struct MemoryHoldings {
    pub rows: Vec<HoldingRow>,
    pub commits: usize,

    /// ETFs whose whole write session fails, as if the pool went away.
    pub failing_etfs: Vec<String>,

    /// Stocks whose single row update fails.
    pub failing_stocks: Vec<String>,
}

impl MemoryHoldings {
    pub fn with_rows(rows: &[(&str, &str)]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|(etf, stock)| HoldingRow {
                    etf: etf.to_string(),
                    stock: stock.to_string(),
                    market_cap: None,
                    updated_at: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing_etf(mut self, etf: &str) -> Self {
        self.failing_etfs.push(etf.to_string());
        self
    }

    pub fn failing_stock(mut self, stock: &str) -> Self {
        self.failing_stocks.push(stock.to_string());
        self
    }

    pub fn market_cap(&self, etf: &str, stock: &str) -> Option<u64> {
        self.rows
            .iter()
            .find(|row| row.etf == etf && row.stock == stock)
            .and_then(|row| row.market_cap)
    }
}

#[async_trait]
impl HoldingsTable for MemoryHoldings {
    async fn holdings(&mut self, etf: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.etf == etf)
            .map(|row| row.stock.clone())
            .collect())
    }

    async fn update_market_caps(
        &mut self,
        etf: &str,
        caps: &[MarketCap],
    ) -> Result<Vec<RowWrite>, StoreError> {
        if self.failing_etfs.iter().any(|failing| failing == etf) {
            return Err(StoreError::Pool(PoolError::Closed));
        }

        let failing_stocks = &self.failing_stocks;
        let writes = caps
            .iter()
            .map(|cap| {
                if failing_stocks.contains(&cap.ticker) {
                    return RowWrite::Failed("constraint violation".to_string());
                }
                match self
                    .rows
                    .iter_mut()
                    .find(|row| row.etf == etf && row.stock == cap.ticker)
                {
                    Some(row) => {
                        row.market_cap = Some(cap.market_cap);
                        row.updated_at = Some(cap.fetched_at);
                        RowWrite::Updated
                    }
                    None => RowWrite::Missing,
                }
            })
            .collect();
        self.commits += 1;
        Ok(writes)
    }
}

/// A [`MemoryHoldings`] handed out once per group; every handle sees the same rows.
#[derive(Clone, Default)]
pub struct SharedHoldings(pub Arc<tokio::sync::Mutex<MemoryHoldings>>);

impl SharedHoldings {
    pub fn new(table: MemoryHoldings) -> Self {
        Self(Arc::new(tokio::sync::Mutex::new(table)))
    }
}

#[async_trait]
impl HoldingsTable for SharedHoldings {
    async fn holdings(&mut self, etf: &str) -> Result<Vec<String>, StoreError> {
        self.0.lock().await.holdings(etf).await
    }

    async fn update_market_caps(
        &mut self,
        etf: &str,
        caps: &[MarketCap],
    ) -> Result<Vec<RowWrite>, StoreError> {
        self.0.lock().await.update_market_caps(etf, caps).await
    }
}
