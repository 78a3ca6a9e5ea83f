use crate::error::SinkError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// What a flush did with the records it was given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// Records persisted.
    pub written: usize,

    /// Records with nowhere to go, e.g. no existing row to update.
    pub skipped: usize,

    /// Records whose write failed; the flush carried on past them.
    pub failed: usize,
}

/// Persists the accepted records of a run.
#[async_trait]
pub trait Sink<R: Sync> {
    async fn flush(&mut self, records: &[R]) -> Result<SinkReport, SinkError>;
}

/// Writes every record as one JSON array to a fixed path; full replace, never append.
#[derive(Clone, Debug)]
pub struct SnapshotSink {
    path: PathBuf,
}

impl SnapshotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl<R: Serialize + Sync> Sink<R> for SnapshotSink {
    async fn flush(&mut self, records: &[R]) -> Result<SinkReport, SinkError> {
        let time = std::time::Instant::now();

        crate::fs::write_json(&self.path, records).await?;

        debug!(
            "{} records written to {}, {}",
            records.len(),
            self.path.display(),
            crate::time_elapsed(time)
        );

        Ok(SinkReport {
            written: records.len(),
            ..SinkReport::default()
        })
    }
}
