use super::sql;
use super::yahoo_finance::{ChartApi, MarketCap, MarketCapTransformer};
use crate::config::HoldingsConfig;
use crate::error::{SinkError, StoreError};
use crate::fetch::{Clock, Fetch, RateGate, RateLimitedFetcher};
use crate::pipeline::{Pipeline, RunReport, RunSummary};
use crate::sink::{Sink, SinkReport};
use crate::source::StaticSource;
use crate::tui::{self, Progress};
use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};
use futures::{stream, StreamExt};
use std::future::Future;
use tracing::{debug, error, info, trace};

// scrape
// ----------------------------------------------------------------------------

/// Refresh the market cap of every holding of every configured ETF.
///
/// Each ETF checks out its own pooled connection, which goes back to the pool when the
/// group ends, however it ends.
pub async fn scrape(pool: &Pool, config: &HoldingsConfig, tui: bool) -> anyhow::Result<RunSummary> {
    let time = std::time::Instant::now();

    let api = ChartApi::new(&config.chart_url)?;
    let fetcher = RateLimitedFetcher::new(api, config.pacing.per_call);
    let mut pipeline = Pipeline::new(fetcher, MarketCapTransformer);
    let mut groups = RateGate::new(config.pacing.per_group);

    info!("refreshing market caps for {} ETFs ...", config.etfs.len());
    let connect = || PgHoldings::connect(pool);
    let total = refresh_all(&config.etfs, connect, &mut pipeline, &mut groups, tui).await;

    info!(
        "market cap refresh finished ({total}), {}",
        crate::time_elapsed(time)
    );

    Ok(total)
}

/// Refresh the ETFs one after another, spaced by the `groups` gate.
///
/// `connect` opens the table for one group. A group that cannot connect or list its
/// holdings is logged and the next one starts; every group that got as far as fetching
/// contributes its counts.
pub async fn refresh_all<T, Conn, Fut, F, C, G>(
    etfs: &[String],
    mut connect: Conn,
    pipeline: &mut Pipeline<F, MarketCapTransformer, C>,
    groups: &mut RateGate<G>,
    tui: bool,
) -> RunSummary
where
    T: HoldingsTable,
    Conn: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
    F: Fetch,
    C: Clock,
    G: Clock,
{
    let mut total = RunSummary::default();

    for etf in etfs {
        groups.wait().await;

        if tui {
            println!("\n{}", tui::banner(&format!("Processing {etf}")));
        }

        let mut table = match connect().await {
            Ok(table) => table,
            Err(err) => {
                error!("failed to connect for {etf}, error({err})");
                continue;
            }
        };

        match refresh_group(&mut table, etf, pipeline, tui).await {
            Ok(report) => total.merge(&report.summary),
            Err(err) => error!("failed to refresh market caps for {etf}, error({err})"),
        }
    }

    total
}

/// List one ETF's holdings, fetch each market cap, then write them all in one session.
///
/// Accepted records that were not written, whether a row failed or the whole flush did,
/// are moved from `succeeded` to `failed` in the returned summary.
pub async fn refresh_group<T, F, C>(
    table: &mut T,
    etf: &str,
    pipeline: &mut Pipeline<F, MarketCapTransformer, C>,
    tui: bool,
) -> anyhow::Result<RunReport>
where
    T: HoldingsTable + ?Sized,
    F: Fetch,
    C: Clock,
{
    let tickers = table.holdings(etf).await.map_err(|err| {
        error!("failed to fetch holdings for {etf}, error({err})");
        err
    })?;
    debug!("found {} holdings for {etf}", tickers.len());
    if tui {
        println!("Found {} holdings for {etf}", tickers.len());
    }

    let source = StaticSource::from_ids(tickers);
    let progress = Progress::new(source.len(), tui)?;
    let mut sink = UpsertSink::new(table, etf);
    let mut report = pipeline.run(&source, &mut sink, &progress).await;
    progress.finish();

    match &report.sink {
        Ok(written) => {
            report.summary.unsaved(written.failed);
            if tui {
                println!(
                    "Updated {}/{} holdings with market cap data",
                    written.written,
                    source.len()
                );
            }
        }
        Err(err) => {
            error!("failed to write market caps for {etf}, error({err})");
            report.summary.unsaved(report.summary.succeeded);
            if tui {
                println!("Failed to write market caps for {etf}: {err}");
            }
        }
    }

    Ok(report)
}

// storage
// ----------------------------------------------------------------------------

/// Result of one row update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowWrite {
    Updated,

    /// No row for this `(etf, stock)` pair; nothing written.
    Missing,

    Failed(String),
}

/// The `etfHoldings` table, as the market-cap refresh sees it.
#[async_trait]
pub trait HoldingsTable: Send {
    /// Stock tickers held by `etf`.
    async fn holdings(&mut self, etf: &str) -> Result<Vec<String>, StoreError>;

    /// Update existing rows only, within one session, committing once at the end.
    ///
    /// Returns one [`RowWrite`] per input, in input order.
    async fn update_market_caps(
        &mut self,
        etf: &str,
        caps: &[MarketCap],
    ) -> Result<Vec<RowWrite>, StoreError>;
}

/// [`HoldingsTable`] on a pooled PostgreSQL connection.
pub struct PgHoldings {
    client: Object,
}

impl PgHoldings {
    pub async fn connect(pool: &Pool) -> Result<Self, StoreError> {
        trace!("checking out pooled connection");
        Ok(Self {
            client: pool.get().await?,
        })
    }
}

#[async_trait]
impl HoldingsTable for PgHoldings {
    async fn holdings(&mut self, etf: &str) -> Result<Vec<String>, StoreError> {
        let tickers = self
            .client
            .query(sql::SELECT_HOLDINGS, &[&etf])
            .await?
            .into_iter()
            .map(|row| row.get(0))
            .collect();

        Ok(tickers)
    }

    async fn update_market_caps(
        &mut self,
        etf: &str,
        caps: &[MarketCap],
    ) -> Result<Vec<RowWrite>, StoreError> {
        let time = std::time::Instant::now();

        // preprocess pg query as transaction
        let query = self.client.prepare_cached(sql::UPDATE_MARKET_CAP).await?;
        let mut transaction = self.client.transaction().await?;

        // iterate over the data stream and execute pg rows
        let mut writes = Vec::with_capacity(caps.len());
        let mut stream = stream::iter(caps);
        while let Some(cap) = stream.next().await {
            let market_cap = match i64::try_from(cap.market_cap) {
                Ok(market_cap) => market_cap,
                Err(err) => {
                    error!("market cap out of range for [{etf}] {}, error({err})", cap.ticker);
                    writes.push(RowWrite::Failed(err.to_string()));
                    continue;
                }
            };

            // a failed statement aborts the whole transaction; confine each row to a savepoint
            let savepoint = transaction.savepoint("market_cap").await?;
            let write = match savepoint
                .execute(&query, &[&market_cap, &cap.fetched_at, &etf, &cap.ticker])
                .await
            {
                Ok(rows) => {
                    savepoint.commit().await?;
                    if rows == 0 {
                        RowWrite::Missing
                    } else {
                        trace!("market cap updated for [{etf}] {}", cap.ticker);
                        RowWrite::Updated
                    }
                }
                Err(err) => {
                    error!("failed to update market cap for [{etf}] {}, error({err})", cap.ticker);
                    savepoint.rollback().await?;
                    RowWrite::Failed(err.to_string())
                }
            };
            writes.push(write);
        }

        // one commit for the whole group; rows rolled back to their savepoint stay unwritten
        transaction.commit().await.map_err(|err| {
            error!("failed to commit market caps for [{etf}], error({err})");
            err
        })?;

        debug!("[{etf}] market caps committed. {}", crate::time_elapsed(time));

        Ok(writes)
    }
}

/// Update-only sink over a [`HoldingsTable`], scoped to one ETF.
pub struct UpsertSink<'a, T: ?Sized> {
    table: &'a mut T,
    etf: String,
}

impl<'a, T: HoldingsTable + ?Sized> UpsertSink<'a, T> {
    pub fn new(table: &'a mut T, etf: impl Into<String>) -> Self {
        Self {
            table,
            etf: etf.into(),
        }
    }
}

#[async_trait]
impl<T: HoldingsTable + ?Sized> Sink<MarketCap> for UpsertSink<'_, T> {
    async fn flush(&mut self, records: &[MarketCap]) -> Result<SinkReport, SinkError> {
        let mut report = SinkReport::default();
        if records.is_empty() {
            return Ok(report);
        }

        let writes = self.table.update_market_caps(&self.etf, records).await?;
        for (record, write) in records.iter().zip(writes) {
            match write {
                RowWrite::Updated => report.written += 1,
                RowWrite::Missing => {
                    debug!("no [{}] {} row to update; skipped", self.etf, record.ticker);
                    report.skipped += 1;
                }
                RowWrite::Failed(_) => report.failed += 1,
            }
        }

        Ok(report)
    }
}
