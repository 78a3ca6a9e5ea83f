use crate::fetch::FetchResult;
use crate::source::TargetEntity;

/// Maps a fetched payload into a normalized record, or rejects it.
///
/// `None` is a decision, not an error: a [`FetchResult::Failure`] always maps to `None`,
/// and a successful payload maps to `None` when a domain rule rejects it. The pipeline
/// tells the two apart when counting.
pub trait Transform {
    type Record;

    fn transform(&self, entity: &TargetEntity, result: &FetchResult) -> Option<Self::Record> {
        match result {
            FetchResult::Success(payload) => self.accept(entity, payload),
            FetchResult::Failure(_) => None,
        }
    }

    /// Domain rules over a successful payload.
    fn accept(&self, entity: &TargetEntity, payload: &serde_json::Value) -> Option<Self::Record>;
}
