pub mod config;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod pipeline;
pub mod sink;
pub mod social;
pub mod source;
pub mod stock;
pub mod transform;
pub mod tui;

pub use error::{ConfigError, FetchError, SinkError, StoreError};
pub use fetch::{Clock, Fetch, FetchResult, RateGate, RateLimitedFetcher, TokioClock};
pub use pipeline::{Batch, Outcome, Pipeline, RunReport, RunSummary};
pub use sink::{Sink, SinkReport, SnapshotSink};
pub use source::{EntitySource, StaticSource, TargetEntity};
pub use transform::Transform;

/// Shortcut for required API elements.
pub(crate) mod http {
    pub(crate) use dotenv::var;
    pub(crate) use reqwest::Client as HttpClient;
}

/// Default reqwest client; used wherever an API does not demand its own user agent.
pub(crate) fn std_client_build() -> Result<http::HttpClient, reqwest::Error> {
    reqwest::ClientBuilder::new().build()
}

/// Readable elapsed time, for trailing log lines.
pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!("time elapsed: {:.2?}", time.elapsed())
}
