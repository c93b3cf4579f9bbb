use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("no landmarks found")]
    EmptyResult,
    #[error("no place found for '{0}'")]
    LookupMiss(String),
    #[error("route optimization failed: {0}")]
    OptimizerFailure(String),
    #[error("invalid visiting order: {0}")]
    InvalidPermutation(String),
    #[error("select at least two landmarks to plan a route (selected: {0})")]
    NotEnoughStops(usize),
    #[error("row {row} does not exist (table has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },
    #[error("no city has been chosen yet")]
    NoCity,
    #[error("no route has been planned yet")]
    NoRoute,
    #[error("{service} responded with status {status}")]
    Status { service: &'static str, status: u16 },
    #[error("missing credential {0}; set it in the environment or in .env")]
    MissingCredential(&'static str),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn optimizer(message: impl Into<String>) -> Self {
        Self::OptimizerFailure(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether an interactive session can keep going after this error.
    ///
    /// Everything caused by a single external call or by the current
    /// selection is recoverable; broken configuration and local I/O are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::MissingCredential(_) | Error::Config(_) | Error::Io(_) | Error::Yaml(_)
        )
    }
}
