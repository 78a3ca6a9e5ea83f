use crate::error::FetchError;
use crate::source::TargetEntity;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// The outcome of exactly one external call for one entity.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchResult {
    Success(serde_json::Value),
    Failure(String),
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }
}

/// An external API capable of answering a GET for one entity with a JSON document.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, entity: &TargetEntity) -> Result<serde_json::Value, FetchError>;
}

/// Time source & sleep capability for [`RateGate`].
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock time, sleeping on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Single-token rate limiter: guarantees at least `interval` between consecutive
/// [`RateGate::wait`] returns. The first wait never sleeps.
#[derive(Debug)]
pub struct RateGate<C = TokioClock> {
    interval: Duration,
    clock: C,
    last: Option<Instant>,
}

impl RateGate<TokioClock> {
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, TokioClock)
    }
}

impl<C: Clock> RateGate<C> {
    pub fn with_clock(interval: Duration, clock: C) -> Self {
        Self {
            interval,
            clock,
            last: None,
        }
    }

    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = self.clock.now().saturating_duration_since(last);
            if elapsed < self.interval {
                let remaining = self.interval - elapsed;
                trace!("rate gate sleeping for {remaining:?}");
                self.clock.sleep(remaining).await;
            }
        }
        self.last = Some(self.clock.now());
    }
}

/// Wraps a [`Fetch`] capability with a [`RateGate`] and folds every error into
/// [`FetchResult::Failure`].
///
/// One attempt per entity: there is no retry, and no timeout beyond the transport's own
/// default. A retry policy would slot in here, around `inner.fetch`.
pub struct RateLimitedFetcher<F, C = TokioClock> {
    inner: F,
    gate: RateGate<C>,
}

impl<F: Fetch> RateLimitedFetcher<F, TokioClock> {
    pub fn new(inner: F, interval: Duration) -> Self {
        Self {
            inner,
            gate: RateGate::new(interval),
        }
    }
}

impl<F: Fetch, C: Clock> RateLimitedFetcher<F, C> {
    pub fn with_gate(inner: F, gate: RateGate<C>) -> Self {
        Self { inner, gate }
    }

    pub async fn fetch(&mut self, entity: &TargetEntity) -> FetchResult {
        self.gate.wait().await;

        trace!("fetching {entity}");
        match self.inner.fetch(entity).await {
            Ok(payload) => FetchResult::Success(payload),
            Err(err) => {
                warn!("failed to fetch {entity}, error({err})");
                FetchResult::Failure(err.to_string())
            }
        }
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
