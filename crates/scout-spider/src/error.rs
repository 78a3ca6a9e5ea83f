use thiserror::Error;

/// Fatal setup problems; raised before any external call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: \"{value}\"")]
    Invalid { name: &'static str, value: String },

    #[error("failed to build http client, error({0})")]
    Client(#[from] reqwest::Error),
}

/// A single external call gone wrong. Captured per entity, never fatal to a run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error({0})")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode payload, error({0})")]
    Decode(#[from] serde_json::Error),

    #[error("api error({0})")]
    Api(String),
}

/// Storage collaborator failures (database reads & writes).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("postgres error({0})")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("failed to check out a pooled connection, error({0})")]
    Pool(#[from] deadpool_postgres::PoolError),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error({0})")]
    Io(#[from] std::io::Error),

    #[error("failed to encode records, error({0})")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
