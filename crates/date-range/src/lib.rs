//! # Aggregation Date Range
//!
//! Turns a human-specified time window into concrete, absolute date ranges
//! suitable for a `date_range` aggregation.
//!
//! ```text
//! (start?, end?, 5 × m, interval?)
//!     │
//!     ├──> end   = end ?? now
//!     ├──> start = start ?? end - window
//!     │
//!     └──> interval?  ──yes──> [start, start+i) [start+i, start+2i) … [.., end)
//!                     ──no───> [start, end)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use agg_date_range::{resolve, DateRangeParams};
//!
//! let params = DateRangeParams::trailing(15, "m").with_interval("5m");
//! let info = resolve(&params).unwrap();
//! assert_eq!(info.date_ranges.len(), 3);
//! ```

mod duration;
mod error;
mod format;
mod resolver;

pub use duration::{parse_duration, TimeSpan, TimeUnit};
pub use error::{DateRangeError, Result};
pub use format::{format_strict_date_time, parse_timestamp, STRICT_DATE_TIME};
pub use resolver::{resolve, resolve_at, DateRange, DateRangeInfo, DateRangeParams, MAX_INTERVALS};
