//! Durations: the stepping contract and ISO 8601 durations.
//!
//! Periods and intervals never do calendar arithmetic themselves. They
//! only ask a [`Step`] to move an instant forward or backward; what "one
//! month" means is decided here.
//!
//! # Grammar
//!
//! `P[nY][nM][nW][nD][T[nH][nM][n[.f]S]]`, with at least one component and
//! at least one time component after `T`. Fractional seconds are kept to
//! millisecond precision (`PT1.5S`, `PT0,25S`).
//!
//! # Arithmetic
//!
//! | Component | Applied as |
//! |-----------|-----------|
//! | Years, months | calendar months; the day is clamped to the end of a shorter month |
//! | Weeks, days | calendar days |
//! | Hours, minutes, seconds | exact milliseconds |
//!
//! Addition applies months, then days, then the time part; subtraction
//! applies them in reverse order.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Days, Months, TimeDelta};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Instant;
use crate::error::{PeriodError, Result};

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:[.,](\d+))?S)?)?$",
    )
    .expect("duration pattern is valid")
});

/// Moves instants along the time line.
///
/// Implementations must be deterministic. `None` means the result falls
/// outside the representable range.
pub trait Step: fmt::Display {
    /// Returns `instant + self`.
    fn add_to(&self, instant: Instant) -> Option<Instant>;

    /// Returns `instant - self`.
    fn subtract_from(&self, instant: Instant) -> Option<Instant>;
}

/// An ISO 8601 duration (`P1M`, `P10D`, `PT1H30M`).
///
/// # Examples
///
/// ```
/// use u_period::{parse_instant, IsoDuration, Step};
///
/// let month: IsoDuration = "P1M".parse().unwrap();
/// let jan = parse_instant("2020-01-31").unwrap();
/// // Clamped to the last day of February.
/// assert_eq!(month.add_to(jan), Some(parse_instant("2020-02-29").unwrap()));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IsoDuration {
    years: u32,
    months: u32,
    weeks: u32,
    days: u32,
    hours: u32,
    minutes: u32,
    /// Seconds component, in milliseconds.
    millis: u64,
}

impl IsoDuration {
    /// Creates a zero duration (`PT0S`).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    pub fn with_months(mut self, months: u32) -> Self {
        self.months = months;
        self
    }

    pub fn with_weeks(mut self, weeks: u32) -> Self {
        self.weeks = weeks;
        self
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn with_hours(mut self, hours: u32) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes;
        self
    }

    /// Sets the seconds component in milliseconds.
    pub fn with_millis(mut self, millis: u64) -> Self {
        self.millis = millis;
        self
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Total calendar months (years folded in).
    fn total_months(&self) -> Option<u32> {
        self.years.checked_mul(12)?.checked_add(self.months)
    }

    /// Total calendar days (weeks folded in).
    fn total_days(&self) -> u64 {
        u64::from(self.weeks) * 7 + u64::from(self.days)
    }

    /// Exact part of the duration (hours, minutes, seconds).
    fn time_delta(&self) -> Option<TimeDelta> {
        let ms = i64::from(self.hours)
            .checked_mul(3_600_000)?
            .checked_add(i64::from(self.minutes).checked_mul(60_000)?)?
            .checked_add(i64::try_from(self.millis).ok()?)?;
        TimeDelta::try_milliseconds(ms)
    }
}

impl Step for IsoDuration {
    fn add_to(&self, instant: Instant) -> Option<Instant> {
        instant
            .checked_add_months(Months::new(self.total_months()?))?
            .checked_add_days(Days::new(self.total_days()))?
            .checked_add_signed(self.time_delta()?)
    }

    fn subtract_from(&self, instant: Instant) -> Option<Instant> {
        instant
            .checked_sub_signed(self.time_delta()?)?
            .checked_sub_days(Days::new(self.total_days()))?
            .checked_sub_months(Months::new(self.total_months()?))
    }
}

impl Step for TimeDelta {
    fn add_to(&self, instant: Instant) -> Option<Instant> {
        instant.checked_add_signed(*self)
    }

    fn subtract_from(&self, instant: Instant) -> Option<Instant> {
        instant.checked_sub_signed(*self)
    }
}

impl FromStr for IsoDuration {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = DURATION_RE
            .captures(s)
            .ok_or_else(|| PeriodError::invalid_duration(s, "not an ISO 8601 duration"))?;

        if caps.iter().skip(1).all(|c| c.is_none()) {
            return Err(PeriodError::invalid_duration(s, "duration has no components"));
        }
        if s.ends_with('T') {
            return Err(PeriodError::invalid_duration(s, "missing time component after 'T'"));
        }

        let number = |idx: usize| -> Result<u32> {
            caps.get(idx).map_or(Ok(0), |m| {
                m.as_str()
                    .parse()
                    .map_err(|_| PeriodError::invalid_duration(s, "component out of range"))
            })
        };

        let whole_seconds = u64::from(number(7)?);
        // Keep the first three fractional digits: "5" -> 500, "25" -> 250.
        let fraction_ms = caps.get(8).map_or(0, |m| {
            m.as_str()
                .chars()
                .chain(std::iter::repeat('0'))
                .take(3)
                .fold(0u64, |acc, c| acc * 10 + u64::from(c.to_digit(10).unwrap_or(0)))
        });

        Ok(Self {
            years: number(1)?,
            months: number(2)?,
            weeks: number(3)?,
            days: number(4)?,
            hours: number(5)?,
            minutes: number(6)?,
            millis: whole_seconds * 1000 + fraction_ms,
        })
    }
}

impl TryFrom<&str> for IsoDuration {
    type Error = PeriodError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for IsoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("PT0S");
        }

        f.write_str("P")?;
        for (value, unit) in [
            (self.years, 'Y'),
            (self.months, 'M'),
            (self.weeks, 'W'),
            (self.days, 'D'),
        ] {
            if value > 0 {
                write!(f, "{value}{unit}")?;
            }
        }

        if self.hours > 0 || self.minutes > 0 || self.millis > 0 {
            f.write_str("T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.millis > 0 {
                let (secs, ms) = (self.millis / 1000, self.millis % 1000);
                if ms == 0 {
                    write!(f, "{secs}S")?;
                } else {
                    let frac = format!("{ms:03}");
                    write!(f, "{secs}.{}S", frac.trim_end_matches('0'))?;
                }
            }
        }
        Ok(())
    }
}

impl Serialize for IsoDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Component-wise form, e.g. `{ days = 1, hours = 12 }`. Missing fields are zero.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DurationDescriptor {
    years: u32,
    months: u32,
    weeks: u32,
    days: u32,
    hours: u32,
    minutes: u32,
    millis: u64,
}

impl From<DurationDescriptor> for IsoDuration {
    fn from(d: DurationDescriptor) -> Self {
        Self {
            years: d.years,
            months: d.months,
            weeks: d.weeks,
            days: d.days,
            hours: d.hours,
            minutes: d.minutes,
            millis: d.millis,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationRepr {
    Iso(String),
    Descriptor(DurationDescriptor),
}

impl<'de> Deserialize<'de> for IsoDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match DurationRepr::deserialize(deserializer)? {
            DurationRepr::Iso(raw) => raw.parse().map_err(serde::de::Error::custom),
            DurationRepr::Descriptor(descriptor) => Ok(descriptor.into()),
        }
    }
}
