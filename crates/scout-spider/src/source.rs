/// One thing to look up: a ticker, a handle, or an ETF with its SEC registry key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetEntity {
    pub id: String,
    pub key: Option<String>,
}

impl TargetEntity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl std::fmt::Display for TargetEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "[{}] {}", self.id, key),
            None => write!(f, "[{}]", self.id),
        }
    }
}

/// Produces the ordered list of entities a run will process.
///
/// Listing is side-effect free and deterministic; an empty list is a valid, no-op run.
pub trait EntitySource {
    fn list(&self) -> Vec<TargetEntity>;
}

/// A fixed, configured list of entities.
#[derive(Clone, Debug, Default)]
pub struct StaticSource(Vec<TargetEntity>);

impl StaticSource {
    pub fn new(entities: Vec<TargetEntity>) -> Self {
        Self(entities)
    }

    /// Entities without registry keys, e.g. tickers or handles.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(TargetEntity::new).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl EntitySource for StaticSource {
    fn list(&self) -> Vec<TargetEntity> {
        self.0.clone()
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
