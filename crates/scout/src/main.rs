mod cli;
mod spider;

// remote imports
use clap::Parser;
use cli::{Cli, TraceLevel};
use scout_spider::tui;
use tracing::{info, subscriber, trace, warn, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preproccess the trace level
fn preprocess(trace_level: Level) {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber).expect("Set subscriber");
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        });
    }
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    // read cli inputs
    use cli::Commands::*;
    let (label, summary, max_failures) = match cli.command {
        // `scout holdings`
        Holdings { etfs, run } => (
            "ETF market cap update",
            spider::holdings(etfs, run, tui).await?,
            run.max_failures,
        ),

        // `scout influencers`
        Influencers {
            seeds,
            min_followers,
            target_count,
            output,
            run,
        } => (
            "Influencer discovery",
            spider::influencers(seeds, min_followers, target_count, output, run, tui).await?,
            run.max_failures,
        ),

        // `scout filings`
        Filings { run } => (
            "SEC filings lookup",
            spider::filings(run, tui).await?,
            run.max_failures,
        ),
    };

    info!("{label} summary: {summary}");
    if tui {
        println!("\n{}", tui::summary_lines(label, &summary));
    }
    if summary.failed > 0 {
        warn!("{} of {} entities failed to fetch", summary.failed, summary.attempted);
    }

    // completing with failures is still a success, unless a threshold was given
    if let Some(max) = max_failures {
        if summary.failed > max {
            anyhow::bail!(
                "{label}: {} failures exceeded the threshold of {max}",
                summary.failed
            );
        }
    }

    Ok(())
}
