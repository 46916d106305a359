use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Date range error: {0}")]
    DateRange(#[from] agg_date_range::DateRangeError),

    #[error("Invalid metric kind: {0}")]
    InvalidMetric(String),
}
