use crate::cli::RunArgs;
use deadpool_postgres::{ManagerConfig, Pool, RecyclingMethod};
use scout_spider as spider;
use scout_spider::config::{FilingsConfig, HoldingsConfig, InfluencerConfig, Pacing};
use scout_spider::RunSummary;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, trace};

/// `scout holdings`: refresh ETF holding market caps.
pub(crate) async fn holdings(
    etfs: Option<Vec<String>>,
    run: RunArgs,
    tui: bool,
) -> anyhow::Result<RunSummary> {
    // configuration errors stop the run before any fetch
    let mut config = HoldingsConfig::from_env()?;
    if let Some(etfs) = etfs {
        config.etfs = etfs;
    }
    config.pacing = pacing(config.pacing, &run);

    let pool = build_pool(&config.database_url)?;
    let time = std::time::Instant::now();
    let summary = spider::stock::holdings::scrape(&pool, &config, tui).await?;
    info!("ETF market cap update completed, time elapsed: {:?}", time.elapsed());

    Ok(summary)
}

/// `scout influencers`: discover & classify credible accounts.
pub(crate) async fn influencers(
    seeds: Option<Vec<String>>,
    min_followers: Option<u64>,
    target_count: Option<usize>,
    output: Option<PathBuf>,
    run: RunArgs,
    tui: bool,
) -> anyhow::Result<RunSummary> {
    let mut config = InfluencerConfig::from_env()?;
    if let Some(seeds) = seeds {
        config.seeds = seeds;
    }
    if let Some(min_followers) = min_followers {
        config.min_followers = min_followers;
    }
    if let Some(target_count) = target_count {
        config.target_count = target_count;
    }
    if let Some(output) = output {
        config.output = output;
    }
    config.pacing = pacing(config.pacing, &run);

    let time = std::time::Instant::now();
    let summary = spider::social::influencers::scrape(&config, tui).await?;
    info!("influencer discovery completed, time elapsed: {:?}", time.elapsed());

    Ok(summary)
}

/// `scout filings`: latest N-PORT filing per ETF.
pub(crate) async fn filings(run: RunArgs, tui: bool) -> anyhow::Result<RunSummary> {
    let mut config = FilingsConfig::from_env()?;
    config.pacing = pacing(config.pacing, &run);

    let time = std::time::Instant::now();
    let summary = spider::stock::sec::scrape(&config, tui).await?;
    info!("SEC filings lookup completed, time elapsed: {:?}", time.elapsed());

    Ok(summary)
}

fn pacing(defaults: Pacing, run: &RunArgs) -> Pacing {
    Pacing::new(
        run.call_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.per_call),
        run.group_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.per_group),
    )
}

fn build_pool(url: &str) -> anyhow::Result<Pool> {
    trace!("creating postgres connection pool config");
    let mut pg_config = deadpool_postgres::Config::new();
    pg_config.url = Some(url.to_string());
    pg_config.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    trace!("creating holdings connection pool");
    let pool = pg_config.create_pool(
        Some(deadpool_postgres::Runtime::Tokio1),
        tokio_postgres::NoTls,
    )?;
    debug!("holdings connection pool established");

    Ok(pool)
}
