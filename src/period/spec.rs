//! Period specifications.
//!
//! A [`PeriodSpec`] is a validated request: a start instant, a step and
//! exactly one stop condition. It can be built from typed values, from an
//! ISO 8601 repeating interval (`R<n>/<start>/<duration>`), or from the
//! loosely typed [`PeriodRequest`] read out of configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PeriodError, Result};
use crate::models::{format_instant, parse_instant, Instant, IsoDuration, Step, ToInstant};

/// When generation stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// Stop before reaching this instant (exclusive).
    End(Instant),
    /// Take exactly this many steps after the start.
    Recurrence(u32),
}

/// A validated period request.
///
/// # Invariants
/// - With [`StopCondition::End`], the end is strictly after the start.
/// - The duration advances the start instant.
///
/// # Examples
///
/// ```
/// use u_period::{generate_period, PeriodSpec};
///
/// let spec: PeriodSpec = "R2/2020-01-01/P1D".parse().unwrap();
/// assert_eq!(generate_period(&spec).unwrap().len(), 3);
/// assert_eq!(spec.to_iso().unwrap(), "R2/2020-01-01T00:00:00.000Z/P1D");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSpec<D = IsoDuration> {
    start: Instant,
    duration: D,
    stop: StopCondition,
}

impl<D: Step> PeriodSpec<D> {
    /// A period bounded by an end instant.
    ///
    /// # Errors
    /// - [`PeriodError::InvalidDate`] if `start` or `end` cannot be coerced.
    /// - [`PeriodError::InvalidPeriodSpec`] if `end` is not after `start`.
    /// - [`PeriodError::InvalidDuration`] if `duration` does not advance `start`.
    pub fn until(start: impl ToInstant, duration: D, end: impl ToInstant) -> Result<Self> {
        let start = start.to_instant()?;
        let end = end.to_instant()?;
        if start >= end {
            return Err(PeriodError::invalid_period("end needs to be after start"));
        }
        Self::checked(start, duration, StopCondition::End(end))
    }

    /// A period of `recurrence + 1` instants.
    ///
    /// # Errors
    /// - [`PeriodError::InvalidDate`] if `start` cannot be coerced.
    /// - [`PeriodError::InvalidDuration`] if `duration` does not advance `start`.
    pub fn recurring(start: impl ToInstant, duration: D, recurrence: u32) -> Result<Self> {
        let start = start.to_instant()?;
        Self::checked(start, duration, StopCondition::Recurrence(recurrence))
    }

    fn checked(start: Instant, duration: D, stop: StopCondition) -> Result<Self> {
        let next = duration.add_to(start).map(|next| next.to_instant()).transpose()?;
        match next {
            Some(next) if next > start => Ok(Self {
                start,
                duration,
                stop,
            }),
            _ => Err(PeriodError::invalid_duration(
                &duration,
                "duration does not advance the start instant",
            )),
        }
    }

    /// First instant of the period.
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Step between consecutive instants.
    pub fn duration(&self) -> &D {
        &self.duration
    }

    pub fn stop(&self) -> StopCondition {
        self.stop
    }

    /// Renders the ISO 8601 repeating interval form.
    ///
    /// Only recurrence-bounded periods have one; end-bounded periods
    /// return `None`.
    pub fn to_iso(&self) -> Option<String> {
        match self.stop {
            StopCondition::Recurrence(n) => Some(format!(
                "R{n}/{}/{}",
                format_instant(&self.start),
                self.duration
            )),
            StopCondition::End(_) => None,
        }
    }
}

impl PeriodSpec<IsoDuration> {
    /// Parses `R<n>/<start>/<duration>`.
    ///
    /// The count must be a plain non-negative integer that fits in `u32`.
    /// Unbounded recurrence (`R/...`) is rejected.
    ///
    /// # Errors
    /// - [`PeriodError::InvalidPeriodSpec`] for a missing `R`, a wrong number
    ///   of segments or an invalid count.
    /// - [`PeriodError::InvalidDate`] / [`PeriodError::InvalidDuration`] for
    ///   the start and duration segments.
    pub fn from_iso(iso: &str) -> Result<Self> {
        if !iso.starts_with('R') {
            return Err(PeriodError::invalid_period("invalid ISO format"));
        }

        let parts: Vec<&str> = iso.split('/').collect();
        let [recurrence, start, duration] = parts.as_slice() else {
            return Err(PeriodError::invalid_period("invalid ISO format"));
        };

        let recurrence = parse_recurrence(&recurrence[1..])?;
        let start = parse_instant(start)?;
        let duration: IsoDuration = duration.parse()?;

        debug!(recurrence, %duration, "parsed ISO repeating interval");
        Self::recurring(start, duration, recurrence)
    }
}

impl FromStr for PeriodSpec<IsoDuration> {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_iso(s)
    }
}

fn parse_recurrence(count: &str) -> Result<u32> {
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PeriodError::invalid_period(format!(
            "invalid number of recurrences '{count}'"
        )));
    }
    count
        .parse()
        .map_err(|_| PeriodError::invalid_period(format!("number of recurrences '{count}' is too large")))
}

/// A recurrence count as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecurrenceField {
    Count(i64),
    Fractional(f64),
    Text(String),
}

/// A duration as it appears in configuration: an ISO 8601 string or a
/// component table (`{ days = 1 }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationField {
    Text(String),
    Descriptor(IsoDuration),
}

impl DurationField {
    pub fn to_duration(&self) -> Result<IsoDuration> {
        match self {
            Self::Text(raw) => raw.parse(),
            Self::Descriptor(duration) => Ok(*duration),
        }
    }
}

impl From<&str> for DurationField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<IsoDuration> for DurationField {
    fn from(value: IsoDuration) -> Self {
        Self::Descriptor(value)
    }
}

/// A loosely typed period request, as read from TOML or JSON.
///
/// Resolution order: `iso` supplies start, duration and recurrence when
/// present, and an explicit `end` still turns it into an end-bounded
/// period. Otherwise `start` and `duration` are required, and `end` takes
/// precedence over `recurrence`.
///
/// ```toml
/// start = "2020-01-01"
/// duration = "P1M"
/// end = "2020-04-01"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeriodRequest {
    pub start: Option<String>,
    pub duration: Option<DurationField>,
    pub end: Option<String>,
    pub recurrence: Option<RecurrenceField>,
    pub iso: Option<String>,
}

impl PeriodRequest {
    /// Validates the request into a [`PeriodSpec`].
    pub fn resolve(&self) -> Result<PeriodSpec> {
        if let Some(iso) = &self.iso {
            let spec = PeriodSpec::from_iso(iso)?;
            return match &self.end {
                Some(end) => PeriodSpec::until(spec.start(), *spec.duration(), end.as_str()),
                None => Ok(spec),
            };
        }

        let start = self
            .start
            .as_deref()
            .ok_or_else(|| PeriodError::invalid_date("<missing start>"))?;
        let start = parse_instant(start)?;

        let duration = self
            .duration
            .as_ref()
            .ok_or_else(|| PeriodError::invalid_duration("<missing>", "missing duration"))?
            .to_duration()?;

        match (&self.end, &self.recurrence) {
            (Some(end), _) => PeriodSpec::until(start, duration, end.as_str()),
            (None, Some(RecurrenceField::Count(n))) => {
                let n = u32::try_from(*n).map_err(|_| {
                    PeriodError::invalid_period(format!("invalid number of recurrences '{n}'"))
                })?;
                PeriodSpec::recurring(start, duration, n)
            }
            (None, Some(other)) => Err(PeriodError::invalid_period(format!(
                "invalid number of recurrences '{other:?}'"
            ))),
            (None, None) => Err(PeriodError::invalid_period(
                "missing end or number of recurrences",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Instant {
        parse_instant(s).unwrap()
    }

    fn days(n: u32) -> IsoDuration {
        IsoDuration::new().with_days(n)
    }

    #[test]
    fn test_until_requires_end_after_start() {
        assert!(PeriodSpec::until("2020-01-01", days(1), "2020-01-02").is_ok());
        for end in ["2020-01-01", "2019-12-31"] {
            assert!(matches!(
                PeriodSpec::until("2020-01-01", days(1), end),
                Err(PeriodError::InvalidPeriodSpec { .. })
            ));
        }
    }

    #[test]
    fn test_bad_start_is_invalid_date() {
        assert!(matches!(
            PeriodSpec::recurring("tomorrow", days(1), 3),
            Err(PeriodError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_zero_duration_rejected_up_front() {
        assert!(matches!(
            PeriodSpec::recurring("2020-01-01", IsoDuration::new(), 0),
            Err(PeriodError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_from_iso() {
        let spec = PeriodSpec::from_iso("R2/2020-01-01/P1D").unwrap();
        assert_eq!(spec.start(), at("2020-01-01"));
        assert_eq!(spec.duration(), &days(1));
        assert_eq!(spec.stop(), StopCondition::Recurrence(2));
    }

    #[test]
    fn test_from_iso_rejects_malformed() {
        for bad in [
            "2/2020-01-01/P1D",
            "",
            "R2/2020-01-01",
            "R2/2020-01-01/P1D/extra",
            "R/2020-01-01/P1D",
            "R-1/2020-01-01/P1D",
            "R+1/2020-01-01/P1D",
            "R2x/2020-01-01/P1D",
            "R99999999999/2020-01-01/P1D",
        ] {
            assert!(
                matches!(PeriodSpec::from_iso(bad), Err(PeriodError::InvalidPeriodSpec { .. })),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn test_from_iso_bad_segments() {
        assert!(matches!(
            PeriodSpec::from_iso("R2/never/P1D"),
            Err(PeriodError::InvalidDate { .. })
        ));
        assert!(matches!(
            PeriodSpec::from_iso("R2/2020-01-01/1D"),
            Err(PeriodError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_to_iso() {
        let spec: PeriodSpec = "R5/2020-01-01T08:00:00Z/PT1H".parse().unwrap();
        assert_eq!(spec.to_iso().unwrap(), "R5/2020-01-01T08:00:00.000Z/PT1H");
        assert_eq!(spec.to_iso().unwrap().parse::<PeriodSpec>().unwrap(), spec);

        let bounded = PeriodSpec::until("2020-01-01", days(1), "2020-02-01").unwrap();
        assert_eq!(bounded.to_iso(), None);
    }

    #[test]
    fn test_request_end_bounded() {
        let req = PeriodRequest {
            start: Some("2020-01-01".into()),
            duration: Some("P1M".into()),
            end: Some("2020-04-01".into()),
            recurrence: Some(RecurrenceField::Count(7)),
            ..Default::default()
        };
        let spec = req.resolve().unwrap();
        assert_eq!(spec.stop(), StopCondition::End(at("2020-04-01")));
    }

    #[test]
    fn test_request_iso_wins() {
        let req = PeriodRequest {
            start: Some("1999-01-01".into()),
            iso: Some("R1/2020-01-01/P1D".into()),
            ..Default::default()
        };
        assert_eq!(req.resolve().unwrap().start(), at("2020-01-01"));
    }

    #[test]
    fn test_request_iso_with_end_is_end_bounded() {
        let req = PeriodRequest {
            iso: Some("R10/2020-01-01/P1D".into()),
            end: Some("2020-01-04".into()),
            ..Default::default()
        };
        let spec = req.resolve().unwrap();
        assert_eq!(spec.start(), at("2020-01-01"));
        assert_eq!(spec.stop(), StopCondition::End(at("2020-01-04")));

        let req = PeriodRequest {
            end: Some("2019-12-31".into()),
            ..req
        };
        assert!(matches!(
            req.resolve(),
            Err(PeriodError::InvalidPeriodSpec { .. })
        ));
    }

    #[test]
    fn test_request_duration_descriptor() {
        let req: PeriodRequest = serde_json::from_str(
            r#"{"start": "2020-01-01", "duration": {"days": 1, "hours": 12}, "recurrence": 1}"#,
        )
        .unwrap();
        let spec = req.resolve().unwrap();
        assert_eq!(spec.duration(), &days(1).with_hours(12));

        let req: PeriodRequest = toml::from_str(
            "start = \"2020-01-01\"\nduration = { weeks = 1 }\nend = \"2020-02-01\"",
        )
        .unwrap();
        assert_eq!(req.resolve().unwrap().duration(), &IsoDuration::new().with_weeks(1));

        let req: PeriodRequest =
            serde_json::from_str(r#"{"start": "2020-01-01", "duration": "1D", "recurrence": 1}"#)
                .unwrap();
        assert!(matches!(req.resolve(), Err(PeriodError::InvalidDuration { .. })));
    }

    #[test]
    fn test_request_stop_condition_errors() {
        let base = PeriodRequest {
            start: Some("2020-01-01".into()),
            duration: Some("P1D".into()),
            ..Default::default()
        };
        assert!(matches!(
            base.resolve(),
            Err(PeriodError::InvalidPeriodSpec { .. })
        ));

        for recurrence in [
            RecurrenceField::Text("three".into()),
            RecurrenceField::Fractional(2.5),
            RecurrenceField::Count(-1),
        ] {
            let req = PeriodRequest {
                recurrence: Some(recurrence),
                ..base.clone()
            };
            assert!(matches!(
                req.resolve(),
                Err(PeriodError::InvalidPeriodSpec { .. })
            ));
        }
    }

    #[test]
    fn test_request_missing_fields() {
        let req = PeriodRequest {
            duration: Some("P1D".into()),
            recurrence: Some(RecurrenceField::Count(1)),
            ..Default::default()
        };
        assert!(matches!(req.resolve(), Err(PeriodError::InvalidDate { .. })));

        let req = PeriodRequest {
            start: Some("2020-01-01".into()),
            recurrence: Some(RecurrenceField::Count(1)),
            ..Default::default()
        };
        assert!(matches!(req.resolve(), Err(PeriodError::InvalidDuration { .. })));
    }

    #[test]
    fn test_request_from_json() {
        let req: PeriodRequest = serde_json::from_str(
            r#"{"start": "2020-01-01", "duration": "P1D", "recurrence": 2}"#,
        )
        .unwrap();
        assert_eq!(req.recurrence, Some(RecurrenceField::Count(2)));
        assert_eq!(req.resolve().unwrap().stop(), StopCondition::Recurrence(2));

        let req: PeriodRequest =
            serde_json::from_str(r#"{"start": "2020-01-01", "duration": "P1D", "recurrence": "2"}"#)
                .unwrap();
        assert!(matches!(
            req.resolve(),
            Err(PeriodError::InvalidPeriodSpec { .. })
        ));
    }
}
