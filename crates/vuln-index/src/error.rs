/// Fatal errors raised while constructing an engine. No engine is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Invalid record source: {0}")]
    InvalidSource(String),

    #[error("Invalid record at position {position}: {reason}")]
    InvalidRecord { position: usize, reason: String },

    #[error("Too many records: {0} exceeds the record id space")]
    TooManyRecords(usize),

    #[error("No async runtime available to schedule the index build")]
    NoRuntime,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("Index build aborted: {0}")]
    BuildAborted(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
