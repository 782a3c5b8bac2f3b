//! ISO 8601 periods and half-open time intervals.
//!
//! Two independent components built on the same instant and duration types:
//!
//! - **Period generation**: step a start instant by a fixed duration until
//!   an end instant (exclusive) or for a fixed number of recurrences, or
//!   expand an ISO 8601 repeating interval (`R<n>/<start>/<duration>`).
//! - **Interval algebra**: immutable `[start, end)` ranges with overlap,
//!   union, difference and intersection, round-tripping through the ISO
//!   8601 `<start>/<end>` form.
//!
//! # Modules
//!
//! - **`models`**: `Instant`, `IsoDuration`/`Step`, `Interval`
//! - **`period`**: `PeriodSpec`, `PeriodRequest`, `generate_period`
//! - **`config`**: named periods and intervals loaded from TOML
//! - **`logging`** (feature `logging`): `tracing-subscriber` setup
//!
//! # Example
//!
//! ```
//! use u_period::{generate_period, Interval, PeriodSpec};
//!
//! let spec: PeriodSpec = "R2/2020-01-01/P1D".parse().unwrap();
//! let days = generate_period(&spec).unwrap();
//! assert_eq!(days.len(), 3);
//!
//! let a = Interval::parse("2020-01-01/P10D").unwrap();
//! let b = Interval::new("2020-01-01", "2020-01-11").unwrap();
//! assert_eq!(a, b);
//! ```

pub mod config;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;
pub mod models;
pub mod period;

pub use config::TimeConfig;
pub use error::{PeriodError, Result};
pub use models::{
    format_instant, parse_instant, Endpoint, Instant, Interval, IsoDuration, Step, ToInstant,
};
pub use period::{
    generate_period, generate_period_with, DurationField, PeriodObserver, PeriodRequest,
    PeriodSpec, RecurrenceField, StopCondition,
};
