use thiserror::Error;

/// Errors raised while selecting a series.
///
/// Compiling and attaching a series join never fails; malformed override
/// text only surfaces as an `sqlx::Error` when the query is executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("unknown series range: {0}")]
    UnknownRange(String),
}

pub type Result<T> = std::result::Result<T, SeriesError>;
