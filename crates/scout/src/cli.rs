use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing.
    ///
    /// Without a trace level, progress is printed to the terminal instead.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh the market cap of every ETF holding in the database (etfHoldings).
    Holdings {
        /// ETF tickers to refresh; defaults to the built-in list.
        #[arg(short, long, value_delimiter = ',')]
        etfs: Option<Vec<String>>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Find credible financial commentators among the seed accounts, and save them to JSON.
    Influencers {
        /// Account handles to check; defaults to the built-in seed list.
        #[arg(short, long, value_delimiter = ',')]
        seeds: Option<Vec<String>>,

        /// Credibility gate: minimum follower count.
        #[arg(long)]
        min_followers: Option<u64>,

        /// Number of influencers the run aims for; falling short is reported.
        #[arg(long)]
        target_count: Option<usize>,

        /// Snapshot file; replaced on every run.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Look up the latest SEC N-PORT filing of each ETF with a known CIK.
    Filings {
        #[command(flatten)]
        run: RunArgs,
    },
}

/// Pacing & failure policy, shared by every job.
#[derive(Args, Debug, Clone, Copy)]
pub struct RunArgs {
    /// Minimum delay between consecutive API calls, in milliseconds.
    #[arg(long)]
    pub call_delay_ms: Option<u64>,

    /// Minimum delay between groups of calls (e.g. ETFs), in milliseconds.
    #[arg(long)]
    pub group_delay_ms: Option<u64>,

    /// Exit with an error when more entities than this fail to fetch.
    #[arg(long)]
    pub max_failures: Option<usize>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}
