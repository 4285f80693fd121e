use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown priority: {0:?}")]
    UnknownPriority(String),

    #[error("unknown appender: {0:?} (expected stdout, stderr or none)")]
    UnknownAppender(String),

    #[error("invalid environment configuration: {0}")]
    Env(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
