use thiserror::Error;

/// Errors surfaced by the search engine. Nothing here is transient; callers
/// get them synchronously and the index is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed word or query word, bad stop word, negative or duplicate id.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The referenced document id is not in the live set.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Self {
        Error::OutOfRange(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
