//! Temporal value types.
//!
//! | Type | Role |
//! |------|------|
//! | [`Instant`] | UTC point in time, millisecond resolution |
//! | [`IsoDuration`] | ISO 8601 duration, the default [`Step`] |
//! | [`Interval`] | immutable half-open range `[start, end)` |

mod duration;
mod instant;
mod interval;

pub use duration::{IsoDuration, Step};
pub use instant::{format_instant, parse_instant, Instant, ToInstant};
pub use interval::{Endpoint, Interval};
