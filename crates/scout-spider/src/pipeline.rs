use crate::error::SinkError;
use crate::fetch::{Clock, Fetch, FetchResult, RateLimitedFetcher, TokioClock};
use crate::sink::{Sink, SinkReport};
use crate::source::EntitySource;
use crate::transform::Transform;
use crate::tui::Progress;
use tracing::{debug, trace};

/// What happened to a single entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Fetched and turned into a record.
    Accepted,

    /// Fetched, but rejected by a domain rule.
    Filtered,

    /// The external call failed.
    Failed,
}

/// Per-run counts; reported, never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub filtered: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: Outcome) {
        self.attempted += 1;
        match outcome {
            Outcome::Accepted => self.succeeded += 1,
            Outcome::Filtered => self.filtered += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Accepted records that never reached storage count as failures.
    pub fn unsaved(&mut self, count: usize) {
        let count = count.min(self.succeeded);
        self.succeeded -= count;
        self.failed += count;
    }

    /// Fold another group's counts into this one.
    pub fn merge(&mut self, other: &RunSummary) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.filtered += other.filtered;
        self.failed += other.failed;
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "attempted={}, succeeded={}, filtered={}, failed={}",
            self.attempted, self.succeeded, self.filtered, self.failed
        )
    }
}

/// Accepted records of one pass, in entity order, with their counts.
#[derive(Debug)]
pub struct Batch<R> {
    pub records: Vec<R>,
    pub summary: RunSummary,
}

/// Counts of a pass, and how its flush went; the counts survive a failed flush.
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub sink: Result<SinkReport, SinkError>,
}

/// Sequential fetch → transform → accumulate over an [`EntitySource`].
///
/// One entity is fully fetched and transformed before the next begins; a failed entity
/// never stops the pass.
pub struct Pipeline<F, T, C = TokioClock> {
    fetcher: RateLimitedFetcher<F, C>,
    transformer: T,
}

impl<F, T, C> Pipeline<F, T, C>
where
    F: Fetch,
    T: Transform,
    C: Clock,
{
    pub fn new(fetcher: RateLimitedFetcher<F, C>, transformer: T) -> Self {
        Self {
            fetcher,
            transformer,
        }
    }

    pub async fn collect<S>(&mut self, source: &S, progress: &Progress) -> Batch<T::Record>
    where
        S: EntitySource + ?Sized,
        T::Record: std::fmt::Display,
    {
        let entities = source.list();
        let mut records = Vec::with_capacity(entities.len());
        let mut summary = RunSummary::default();

        for entity in &entities {
            let result = self.fetcher.fetch(entity).await;

            let outcome = match (self.transformer.transform(entity, &result), &result) {
                (Some(record), _) => {
                    progress.println(format!("  {record}"));
                    records.push(record);
                    Outcome::Accepted
                }
                (None, FetchResult::Success(_)) => {
                    trace!("{entity} filtered out");
                    progress.println(format!("  {}: skipped", entity.id));
                    Outcome::Filtered
                }
                (None, FetchResult::Failure(reason)) => {
                    progress.println(format!("  {}: error - {reason}", entity.id));
                    Outcome::Failed
                }
            };

            summary.record(outcome);
            progress.record(outcome);
        }

        debug!("pipeline pass complete: {summary}");
        Batch { records, summary }
    }

    /// [`Pipeline::collect`], then flush the accepted records once into `sink`.
    pub async fn run<S, K>(&mut self, source: &S, sink: &mut K, progress: &Progress) -> RunReport
    where
        S: EntitySource + ?Sized,
        K: Sink<T::Record> + ?Sized,
        T::Record: std::fmt::Display + Sync,
    {
        let batch = self.collect(source, progress).await;
        let sink = sink.flush(&batch.records).await;

        RunReport {
            summary: batch.summary,
            sink,
        }
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
