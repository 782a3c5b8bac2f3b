//! Instants and the `ToInstant` capability.
//!
//! # Time Model
//! An instant is a UTC point in time with millisecond resolution. Every
//! value entering the crate is truncated to whole milliseconds, so two
//! instants that render to the same ISO 8601 string always compare equal.
//!
//! # Accepted Inputs
//! - native `chrono` date-times (UTC or fixed offset),
//! - ISO 8601 strings: RFC 3339 (`2020-01-01T10:00:00+02:00`), naive
//!   date-times (`2020-01-01T10:00`, read as UTC) and bare dates
//!   (`2020-01-01`, UTC midnight),
//! - any type implementing [`ToInstant`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, SubsecRound, Utc};

use crate::error::{PeriodError, Result};

/// A point in time, UTC, millisecond resolution.
pub type Instant = DateTime<Utc>;

/// Naive date-time layouts tried after RFC 3339, in order.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Capability of converting a value into an [`Instant`].
///
/// Implement this for a domain wrapper (a business date, a timestamp
/// newtype) to pass it wherever the crate asks for `impl ToInstant`.
///
/// # Examples
///
/// ```
/// use u_period::{Instant, Result, ToInstant};
///
/// struct Deadline(Instant);
///
/// impl ToInstant for Deadline {
///     fn to_instant(&self) -> Result<Instant> {
///         self.0.to_instant()
///     }
/// }
///
/// let d = Deadline("2020-01-01".to_instant().unwrap());
/// assert_eq!(u_period::format_instant(&d.to_instant().unwrap()), "2020-01-01T00:00:00.000Z");
/// ```
pub trait ToInstant {
    /// Converts `self` into a millisecond-resolution UTC instant.
    fn to_instant(&self) -> Result<Instant>;
}

impl ToInstant for DateTime<Utc> {
    fn to_instant(&self) -> Result<Instant> {
        Ok(self.trunc_subsecs(3))
    }
}

impl ToInstant for DateTime<FixedOffset> {
    fn to_instant(&self) -> Result<Instant> {
        Ok(self.with_timezone(&Utc).trunc_subsecs(3))
    }
}

impl ToInstant for NaiveDateTime {
    fn to_instant(&self) -> Result<Instant> {
        Ok(self.and_utc().trunc_subsecs(3))
    }
}

impl ToInstant for NaiveDate {
    fn to_instant(&self) -> Result<Instant> {
        Ok(self.and_time(NaiveTime::MIN).and_utc())
    }
}

impl ToInstant for str {
    fn to_instant(&self) -> Result<Instant> {
        parse_instant(self)
    }
}

impl ToInstant for String {
    fn to_instant(&self) -> Result<Instant> {
        parse_instant(self)
    }
}

impl<T: ToInstant + ?Sized> ToInstant for &T {
    fn to_instant(&self) -> Result<Instant> {
        (**self).to_instant()
    }
}

/// Parses an ISO 8601 instant string.
///
/// # Errors
/// [`PeriodError::InvalidDate`] when none of the accepted layouts match.
pub fn parse_instant(value: &str) -> Result<Instant> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.to_instant();
    }

    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return ndt.to_instant();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.to_instant();
    }

    Err(PeriodError::invalid_date(value))
}

/// Renders an instant as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_instant(instant: &Instant) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
