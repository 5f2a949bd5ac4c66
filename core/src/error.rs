use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing an engine or answering a query.
///
/// `Schema`, `Build`, `Io` and `Csv` only occur during construction and mean no
/// engine was produced. `Validation` and `NotFound` are per-query and leave the
/// engine untouched.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required column: {column}")]
    Schema { column: &'static str },

    #[error("cannot build term vectors: {0}")]
    Build(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),
}
