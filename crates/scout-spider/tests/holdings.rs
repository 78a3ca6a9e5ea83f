mod common;

use chrono::Utc;
use common::{chart, ManualClock, MemoryHoldings, ScriptedFetch, SharedHoldings};
use deadpool_postgres::PoolError;
use scout_spider::stock::holdings::{refresh_all, refresh_group, UpsertSink};
use scout_spider::stock::yahoo_finance::{MarketCap, MarketCapTransformer};
use scout_spider::{
    Pipeline, RateGate, RateLimitedFetcher, RunSummary, Sink, SinkError, SinkReport, StoreError,
};
use serde_json::json;
use std::time::Duration;

fn pipeline(
    fetch: &ScriptedFetch,
    interval: Duration,
    clock: ManualClock,
) -> Pipeline<ScriptedFetch, MarketCapTransformer, ManualClock> {
    let gate = RateGate::with_clock(interval, clock);
    Pipeline::new(
        RateLimitedFetcher::with_gate(fetch.clone(), gate),
        MarketCapTransformer,
    )
}

fn cap(ticker: &str, market_cap: u64) -> MarketCap {
    MarketCap {
        ticker: ticker.to_string(),
        market_cap,
        fetched_at: Utc::now(),
    }
}

#[tokio::test]
async fn missing_rows_are_skipped_not_created() {
    let mut table = MemoryHoldings::with_rows(&[("SPY", "AAPL")]);
    let before = table.rows.len();

    let report = UpsertSink::new(&mut table, "SPY")
        .flush(&[cap("AAPL", 3_000_000_000_000), cap("NOPE", 42)])
        .await
        .unwrap();

    assert_eq!(
        report,
        SinkReport {
            written: 1,
            skipped: 1,
            failed: 0,
        }
    );
    assert_eq!(table.rows.len(), before);
    assert_eq!(table.market_cap("SPY", "AAPL"), Some(3_000_000_000_000));
    assert!(table.rows.iter().all(|row| row.stock != "NOPE"));
}

#[tokio::test]
async fn rows_of_other_etfs_are_untouched() {
    let mut table = MemoryHoldings::with_rows(&[("SPY", "AAPL"), ("QQQ", "AAPL")]);

    UpsertSink::new(&mut table, "QQQ")
        .flush(&[cap("AAPL", 99)])
        .await
        .unwrap();

    assert_eq!(table.market_cap("QQQ", "AAPL"), Some(99));
    assert_eq!(table.market_cap("SPY", "AAPL"), None);
}

#[tokio::test]
async fn one_commit_per_flush() {
    let mut table = MemoryHoldings::with_rows(&[("SPY", "A"), ("SPY", "B"), ("SPY", "C")]);

    UpsertSink::new(&mut table, "SPY")
        .flush(&[cap("A", 1), cap("B", 2), cap("C", 3)])
        .await
        .unwrap();
    assert_eq!(table.commits, 1);

    // nothing to write, nothing to commit
    let report = UpsertSink::new(&mut table, "SPY").flush(&[]).await.unwrap();
    assert_eq!(report, SinkReport::default());
    assert_eq!(table.commits, 1);
}

#[tokio::test]
async fn refresh_group_end_to_end() {
    let mut table = MemoryHoldings::with_rows(&[("SPY", "AAA"), ("SPY", "BBB"), ("QQQ", "CCC")]);
    let fetch = ScriptedFetch::new()
        .ok("AAA", chart(json!(5_000_000_000u64)))
        .err("BBB", "network error")
        .ok("CCC", chart(json!(1)));

    let clock = ManualClock::new();
    let mut pipeline = pipeline(&fetch, Duration::from_millis(200), clock.clone());

    let report = refresh_group(&mut table, "SPY", &mut pipeline, false)
        .await
        .unwrap();

    assert_eq!(
        report.summary,
        RunSummary {
            attempted: 2,
            succeeded: 1,
            filtered: 0,
            failed: 1,
        }
    );
    assert_eq!(report.sink.unwrap().written, 1);
    assert_eq!(table.market_cap("SPY", "AAA"), Some(5_000_000_000));
    assert_eq!(table.market_cap("SPY", "BBB"), None);
    assert!(table.rows[0].updated_at.is_some());

    // only SPY's holdings were fetched
    assert_eq!(fetch.calls(), vec!["AAA", "BBB"]);
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(200)]);
}

#[tokio::test]
async fn etf_without_holdings() {
    let mut table = MemoryHoldings::with_rows(&[("SPY", "AAA")]);
    let fetch = ScriptedFetch::new();
    let mut pipeline = pipeline(&fetch, Duration::ZERO, ManualClock::new());

    let report = refresh_group(&mut table, "ARKK", &mut pipeline, false)
        .await
        .unwrap();

    assert_eq!(report.summary, RunSummary::default());
    assert!(fetch.calls().is_empty());
    assert_eq!(table.commits, 0);
}

#[tokio::test]
async fn failed_flush_keeps_the_counts() {
    let mut table = MemoryHoldings::with_rows(&[("SPY", "AAA"), ("SPY", "BBB"), ("SPY", "CCC")])
        .failing_etf("SPY");
    let fetch = ScriptedFetch::new()
        .ok("AAA", chart(json!(5_000_000_000u64)))
        .err("BBB", "network error")
        .err("CCC", "network error");
    let mut pipeline = pipeline(&fetch, Duration::ZERO, ManualClock::new());

    let report = refresh_group(&mut table, "SPY", &mut pipeline, false)
        .await
        .unwrap();

    assert_eq!(fetch.calls(), vec!["AAA", "BBB", "CCC"]);
    assert!(matches!(
        report.sink,
        Err(SinkError::Store(StoreError::Pool(PoolError::Closed)))
    ));
    // the unsaved record joins the fetch failures
    assert_eq!(
        report.summary,
        RunSummary {
            attempted: 3,
            succeeded: 0,
            filtered: 0,
            failed: 3,
        }
    );
    assert_eq!(table.market_cap("SPY", "AAA"), None);
}

#[tokio::test]
async fn failed_row_is_not_counted_as_written() {
    let mut table =
        MemoryHoldings::with_rows(&[("SPY", "AAA"), ("SPY", "BBB")]).failing_stock("BBB");
    let fetch = ScriptedFetch::new()
        .ok("AAA", chart(json!(10)))
        .ok("BBB", chart(json!(20)));
    let mut pipeline = pipeline(&fetch, Duration::ZERO, ManualClock::new());

    let report = refresh_group(&mut table, "SPY", &mut pipeline, false)
        .await
        .unwrap();

    assert_eq!(
        report.sink.unwrap(),
        SinkReport {
            written: 1,
            skipped: 0,
            failed: 1,
        }
    );
    assert_eq!((report.summary.succeeded, report.summary.failed), (1, 1));
    assert_eq!(table.market_cap("SPY", "AAA"), Some(10));
    assert_eq!(table.market_cap("SPY", "BBB"), None);
    assert_eq!(table.commits, 1);
}

#[tokio::test]
async fn every_group_counts_towards_the_run() {
    let rows = [("SPY", "AAA"), ("QQQ", "BBB"), ("DIA", "CCC"), ("IWM", "DDD")];
    let shared = SharedHoldings::new(MemoryHoldings::with_rows(&rows).failing_etf("QQQ"));
    let fetch = ScriptedFetch::new()
        .ok("AAA", chart(json!(10)))
        .ok("BBB", chart(json!(20)))
        .err("CCC", "HTTP 500")
        .ok("DDD", chart(json!(40)));
    let mut pipeline = pipeline(&fetch, Duration::ZERO, ManualClock::new());

    let group_clock = ManualClock::new();
    let mut groups = RateGate::with_clock(Duration::from_millis(1000), group_clock.clone());

    // the fourth group never gets a connection
    let mut connects = 0;
    let connect = || {
        connects += 1;
        let table = shared.clone();
        let refused = connects == 4;
        async move {
            if refused {
                Err(StoreError::Pool(PoolError::Closed))
            } else {
                Ok(table)
            }
        }
    };

    let etfs: Vec<String> = ["SPY", "QQQ", "DIA", "IWM"].map(String::from).to_vec();
    let total = refresh_all(&etfs, connect, &mut pipeline, &mut groups, false).await;

    assert_eq!(group_clock.sleeps(), vec![Duration::from_millis(1000); 3]);
    assert_eq!(fetch.calls(), vec!["AAA", "BBB", "CCC"]);
    assert_eq!(
        total,
        RunSummary {
            attempted: 3,
            succeeded: 1,
            filtered: 0,
            failed: 2,
        }
    );

    let table = shared.0.lock().await;
    assert_eq!(table.market_cap("SPY", "AAA"), Some(10));
    assert_eq!(table.market_cap("QQQ", "BBB"), None);
    assert_eq!(table.commits, 1);
}
