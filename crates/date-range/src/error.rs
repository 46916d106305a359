use thiserror::Error;

/// Result type for date range resolution
pub type Result<T> = std::result::Result<T, DateRangeError>;

/// Errors raised while turning window parameters into absolute ranges.
///
/// All of these are caller mistakes: the resolver never fails on
/// well-formed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Window size is not positive or its unit is not recognized
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    /// Sub-interval could not be parsed or is not positive
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Start or end timestamp could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Unknown duration unit suffix
    #[error("Unknown time unit: {0}")]
    UnknownUnit(String),

    /// Resolved window is empty or inverted
    #[error("Date start {start} must be before date end {end}")]
    StartNotBeforeEnd { start: String, end: String },

    /// Interval is too fine for the window
    #[error("Date range would produce more than {max} intervals")]
    TooManyIntervals { max: usize },
}

impl DateRangeError {
    /// Create an invalid window error
    pub fn invalid_window(msg: impl Into<String>) -> Self {
        Self::InvalidWindow(msg.into())
    }

    /// Create an invalid interval error
    pub fn invalid_interval(msg: impl Into<String>) -> Self {
        Self::InvalidInterval(msg.into())
    }

    /// Create an invalid date error
    pub fn invalid_date(msg: impl Into<String>) -> Self {
        Self::InvalidDate(msg.into())
    }
}
