//! Half-open time intervals and their set algebra.
//!
//! # Time Model
//! An [`Interval`] is `[start, end)`: it includes `start`, excludes `end`,
//! and always satisfies `start < end`. Two intervals that merely touch
//! (`a.end == b.start`) are adjacent but do not overlap.
//!
//! # Construction
//! Each endpoint is an instant, an ISO 8601 instant string, or an ISO 8601
//! duration anchored at the other endpoint:
//!
//! | Range string | Meaning |
//! |--------------|---------|
//! | `2020-01-01/2020-02-01` | explicit start and end |
//! | `2020-01-01/P10D` | start, end = start + 10 days |
//! | `P10D/2020-01-11` | start = end - 10 days, end |
//!
//! # Operations
//!
//! | Operation | Result |
//! |-----------|--------|
//! | [`overlaps`](Interval::overlaps) | `a.start < b.end && b.start < a.end` |
//! | [`union`](Interval::union) | one merged interval if overlapping or adjacent, else both |
//! | [`diff`](Interval::diff) | zero, one or two pieces of `a` not covered by `b` |
//! | [`intersection`](Interval::intersection) | the covered region, if any |

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use super::{format_instant, parse_instant, Instant, IsoDuration, Step, ToInstant};
use crate::error::{PeriodError, Result};

/// One endpoint as supplied to [`Interval::new`].
///
/// Only native instants, strings and ISO durations are accepted here.
/// Other [`ToInstant`] wrappers must be converted by the caller first.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// A resolved instant.
    Instant(Instant),
    /// A duration anchored at the opposite endpoint.
    Duration(IsoDuration),
    /// An ISO 8601 instant, or an ISO 8601 duration when it starts with `P`.
    Text(String),
}

impl From<Instant> for Endpoint {
    fn from(value: Instant) -> Self {
        Self::Instant(value)
    }
}

impl From<DateTime<FixedOffset>> for Endpoint {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Instant(value.with_timezone(&Utc))
    }
}

impl From<IsoDuration> for Endpoint {
    fn from(value: IsoDuration) -> Self {
        Self::Duration(value)
    }
}

impl From<&str> for Endpoint {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Endpoint {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// An endpoint after parsing, before anchoring.
enum Resolved {
    At(Instant),
    Offset(IsoDuration),
}

impl Endpoint {
    fn resolve(self) -> Result<Resolved> {
        match self {
            Self::Instant(i) => Ok(Resolved::At(i.to_instant()?)),
            Self::Duration(d) => Ok(Resolved::Offset(d)),
            Self::Text(s) => {
                let s = s.trim();
                if s.starts_with('P') {
                    Ok(Resolved::Offset(s.parse()?))
                } else {
                    Ok(Resolved::At(parse_instant(s)?))
                }
            }
        }
    }
}

/// An immutable half-open time interval `[start, end)`.
///
/// # Examples
///
/// ```
/// use u_period::Interval;
///
/// let month = Interval::new("2020-01-01", "2020-02-01").unwrap();
/// let holiday = Interval::new("2020-01-10", "2020-01-20").unwrap();
///
/// let working: Vec<String> = month.diff(&holiday).iter().map(|i| i.to_string()).collect();
/// assert_eq!(
///     working,
///     vec![
///         "2020-01-01T00:00:00.000Z/2020-01-10T00:00:00.000Z",
///         "2020-01-20T00:00:00.000Z/2020-02-01T00:00:00.000Z",
///     ]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    start: Instant,
    end: Instant,
}

impl Interval {
    /// Builds an interval from two endpoints.
    ///
    /// A duration at position 0 is subtracted from the end; a duration at
    /// position 1 is added to the start.
    ///
    /// # Errors
    /// - [`PeriodError::InvalidDate`] if an instant string does not parse.
    /// - [`PeriodError::InvalidDuration`] if a duration string does not parse
    ///   or anchoring leaves the representable range.
    /// - [`PeriodError::InvalidIntervalSpec`] if both endpoints are durations
    ///   or the resolved start is not strictly before the end.
    pub fn new(start: impl Into<Endpoint>, end: impl Into<Endpoint>) -> Result<Self> {
        let (start, end) = match (start.into().resolve()?, end.into().resolve()?) {
            (Resolved::At(s), Resolved::At(e)) => (s, e),
            (Resolved::Offset(d), Resolved::At(e)) => {
                let s = d
                    .subtract_from(e)
                    .ok_or_else(|| PeriodError::invalid_duration(d, "start out of range"))?;
                (s, e)
            }
            (Resolved::At(s), Resolved::Offset(d)) => {
                let e = d
                    .add_to(s)
                    .ok_or_else(|| PeriodError::invalid_duration(d, "end out of range"))?;
                (s, e)
            }
            (Resolved::Offset(_), Resolved::Offset(_)) => {
                return Err(PeriodError::invalid_interval(
                    "both endpoints are durations, no anchor instant",
                ));
            }
        };

        Self::from_instants(start, end)
    }

    /// Parses a `<start>/<end>` range string.
    ///
    /// # Errors
    /// [`PeriodError::InvalidIntervalSpec`] if the string is empty or does not
    /// hold exactly two `/`-separated endpoints, plus everything
    /// [`Interval::new`] can return.
    pub fn parse(range: &str) -> Result<Self> {
        let range = range.trim();
        if range.is_empty() {
            return Err(PeriodError::invalid_interval(
                "time interval requires at least one valid argument",
            ));
        }

        let parts: Vec<&str> = range.split('/').map(str::trim).collect();
        match parts.as_slice() {
            [start, end] if !start.is_empty() && !end.is_empty() => Self::new(*start, *end),
            _ => {
                debug!(range, "rejecting range without exactly two endpoints");
                Err(PeriodError::invalid_interval(format!(
                    "expected '<start>/<end>', got '{range}'"
                )))
            }
        }
    }

    /// Creates an interval from two instants.
    ///
    /// # Errors
    /// [`PeriodError::InvalidIntervalSpec`] unless `start < end`.
    pub fn from_instants(start: Instant, end: Instant) -> Result<Self> {
        let (start, end) = (start.to_instant()?, end.to_instant()?);
        if start >= end {
            return Err(PeriodError::invalid_interval(format!(
                "start {} must be before end {}",
                format_instant(&start),
                format_instant(&end)
            )));
        }
        Ok(Self { start, end })
    }

    /// Inclusive start.
    #[inline]
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Exclusive end.
    #[inline]
    pub fn end(&self) -> Instant {
        self.end
    }

    /// Length of the interval.
    #[inline]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whether an instant falls within `[start, end)`.
    #[inline]
    pub fn contains(&self, instant: Instant) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether two intervals overlap. Touching endpoints do not count.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the intervals share a boundary without overlapping.
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// Merges two intervals.
    ///
    /// Returns a single interval spanning both when they overlap or are
    /// adjacent; otherwise both, in argument order.
    pub fn union(&self, other: &Self) -> Vec<Self> {
        if self.overlaps(other) || self.is_adjacent(other) {
            return vec![Self {
                start: self.start.min(other.start),
                end: self.end.max(other.end),
            }];
        }

        vec![*self, *other]
    }

    /// The parts of `self` not covered by `other`.
    pub fn diff(&self, other: &Self) -> Vec<Self> {
        if !self.overlaps(other) {
            return vec![*self];
        }

        if other.start <= self.start {
            if other.end < self.end {
                // Head covered.
                return vec![Self {
                    start: other.end,
                    end: self.end,
                }];
            }
            return Vec::new();
        }

        if other.end < self.end {
            // Strictly interior: split in two.
            return vec![
                Self {
                    start: self.start,
                    end: other.start,
                },
                Self {
                    start: other.end,
                    end: self.end,
                },
            ];
        }

        // Tail covered.
        vec![Self {
            start: self.start,
            end: other.start,
        }]
    }

    /// The region covered by both intervals, or `None` if they do not overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }

        Some(Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

impl FromStr for Interval {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", format_instant(&self.start), format_instant(&self.end))
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
