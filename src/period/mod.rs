//! Period generation.
//!
//! Turns a [`PeriodSpec`] into the full, strictly increasing list of
//! instants it describes.
//!
//! # Modes
//!
//! | Stop condition | Output |
//! |----------------|--------|
//! | `End(end)` | `start, start+d, ...` while `< end` (end excluded) |
//! | `Recurrence(n)` | `start` plus exactly `n` further steps (`n + 1` instants) |
//!
//! # Termination
//! Every step must move the clock strictly forward. A step that stalls,
//! goes backwards or leaves the representable range aborts generation
//! with [`PeriodError::InvalidDuration`]; no partial list is returned.

mod spec;

pub use spec::{DurationField, PeriodRequest, PeriodSpec, RecurrenceField, StopCondition};

use tracing::trace;

use crate::error::{PeriodError, Result};
use crate::models::{format_instant, Instant, Step, ToInstant};

/// Receives each instant as it is generated.
///
/// Purely diagnostic: observers cannot change the result.
pub trait PeriodObserver {
    fn on_instant(&mut self, index: usize, instant: &Instant);
}

impl<F> PeriodObserver for F
where
    F: FnMut(usize, &Instant),
{
    fn on_instant(&mut self, index: usize, instant: &Instant) {
        self(index, instant);
    }
}

/// Generates every instant of a period.
///
/// # Examples
///
/// ```
/// use u_period::{format_instant, generate_period, IsoDuration, PeriodSpec};
///
/// let monthly = PeriodSpec::until("2020-01-01", "P1M".parse::<IsoDuration>().unwrap(), "2020-04-01").unwrap();
/// let dates: Vec<String> = generate_period(&monthly).unwrap().iter().map(format_instant).collect();
/// assert_eq!(
///     dates,
///     vec![
///         "2020-01-01T00:00:00.000Z",
///         "2020-02-01T00:00:00.000Z",
///         "2020-03-01T00:00:00.000Z",
///     ]
/// );
/// ```
pub fn generate_period<D: Step>(spec: &PeriodSpec<D>) -> Result<Vec<Instant>> {
    generate_period_with(spec, &mut |_: usize, _: &Instant| {})
}

/// Like [`generate_period`], notifying `observer` once per instant.
pub fn generate_period_with<D, O>(spec: &PeriodSpec<D>, observer: &mut O) -> Result<Vec<Instant>>
where
    D: Step,
    O: PeriodObserver + ?Sized,
{
    let duration = spec.duration();
    let mut dates = Vec::new();
    let mut current = spec.start();

    match spec.stop() {
        StopCondition::End(end) => {
            while current < end {
                hit(&mut dates, observer, current);
                current = advance(duration, current)?;
            }
        }
        StopCondition::Recurrence(recurrence) => {
            hit(&mut dates, observer, current);
            for _ in 0..recurrence {
                current = advance(duration, current)?;
                hit(&mut dates, observer, current);
            }
        }
    }

    Ok(dates)
}

fn hit<O: PeriodObserver + ?Sized>(dates: &mut Vec<Instant>, observer: &mut O, instant: Instant) {
    trace!(index = dates.len(), instant = %format_instant(&instant), "hit");
    observer.on_instant(dates.len(), &instant);
    dates.push(instant);
}

/// Steps once, requiring strict forward progress.
fn advance<D: Step>(duration: &D, instant: Instant) -> Result<Instant> {
    let next = duration
        .add_to(instant)
        .ok_or_else(|| PeriodError::invalid_duration(duration, "step leaves the representable range"))?
        .to_instant()?;

    if next <= instant {
        return Err(PeriodError::invalid_duration(
            duration,
            "duration does not advance the instant",
        ));
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_instant, IsoDuration};
    use std::cell::Cell;
    use std::fmt;

    fn at(s: &str) -> Instant {
        parse_instant(s).unwrap()
    }

    fn dur(s: &str) -> IsoDuration {
        s.parse().unwrap()
    }

    /// Advances normally for a fixed number of calls, then stalls.
    struct StallingStep {
        remaining: Cell<u32>,
    }

    impl fmt::Display for StallingStep {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("stalling")
        }
    }

    impl Step for StallingStep {
        fn add_to(&self, instant: Instant) -> Option<Instant> {
            let left = self.remaining.get();
            if left == 0 {
                return Some(instant);
            }
            self.remaining.set(left - 1);
            dur("P1D").add_to(instant)
        }

        fn subtract_from(&self, instant: Instant) -> Option<Instant> {
            Some(instant)
        }
    }

    #[test]
    fn test_end_bounded_monthly() {
        let spec = PeriodSpec::until("2020-01-01", dur("P1M"), "2020-04-01").unwrap();
        assert_eq!(
            generate_period(&spec).unwrap(),
            vec![at("2020-01-01"), at("2020-02-01"), at("2020-03-01")]
        );
    }

    #[test]
    fn test_end_excluded_but_partial_step_included() {
        let spec = PeriodSpec::until("2020-01-01", dur("P1D"), "2020-01-03T12:00:00Z").unwrap();
        let dates = generate_period(&spec).unwrap();
        assert_eq!(dates, vec![at("2020-01-01"), at("2020-01-02"), at("2020-01-03")]);
    }

    #[test]
    fn test_end_bounded_properties() {
        let start = at("2020-01-01");
        let end = at("2020-03-15T06:00:00Z");
        for d in ["PT7H", "P1D", "P1W", "P2W3D", "P1M"] {
            let spec = PeriodSpec::until(start, dur(d), end).unwrap();
            let dates = generate_period(&spec).unwrap();
            assert_eq!(dates[0], start);
            assert!(dates.iter().all(|i| *i >= start && *i < end), "{d}");
            assert!(dates.windows(2).all(|w| w[0] < w[1]), "{d}");
        }
    }

    #[test]
    fn test_step_longer_than_period() {
        let spec = PeriodSpec::until("2020-01-01", dur("P1Y"), "2020-01-02").unwrap();
        assert_eq!(generate_period(&spec).unwrap(), vec![at("2020-01-01")]);
    }

    #[test]
    fn test_recurrence_bounded_daily() {
        let spec = PeriodSpec::recurring("2020-01-01", dur("P1D"), 2).unwrap();
        assert_eq!(
            generate_period(&spec).unwrap(),
            vec![at("2020-01-01"), at("2020-01-02"), at("2020-01-03")]
        );
    }

    #[test]
    fn test_recurrence_length() {
        for r in [0u32, 1, 5, 40] {
            let spec = PeriodSpec::recurring("2020-01-31", dur("P1M"), r).unwrap();
            let dates = generate_period(&spec).unwrap();
            assert_eq!(dates.len(), r as usize + 1);
            assert_eq!(dates[0], at("2020-01-31"));
            assert!(dates.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_iso_repeating_interval() {
        let spec: PeriodSpec = "R3/2020-01-01T00:00:00Z/PT6H".parse().unwrap();
        assert_eq!(
            generate_period(&spec).unwrap(),
            vec![
                at("2020-01-01T00:00:00Z"),
                at("2020-01-01T06:00:00Z"),
                at("2020-01-01T12:00:00Z"),
                at("2020-01-01T18:00:00Z"),
            ]
        );
    }

    #[test]
    fn test_zero_duration_fails_instead_of_looping() {
        let err = PeriodSpec::until("2020-01-01", dur("PT0S"), "2020-02-01").unwrap_err();
        assert!(matches!(err, PeriodError::InvalidDuration { .. }));

        let err = "R3/2020-01-01/PT0S".parse::<PeriodSpec>().unwrap_err();
        assert!(matches!(err, PeriodError::InvalidDuration { .. }));
    }

    #[test]
    fn test_stalling_step_aborts_end_bounded() {
        // One good step for validation, one for generation, then it stalls.
        let step = StallingStep {
            remaining: Cell::new(2),
        };
        let spec = PeriodSpec::until("2020-01-01", step, "2020-02-01").unwrap();
        let err = generate_period(&spec).unwrap_err();
        assert!(matches!(err, PeriodError::InvalidDuration { .. }));
    }

    #[test]
    fn test_stalling_step_aborts_recurrence_bounded() {
        let step = StallingStep {
            remaining: Cell::new(3),
        };
        let spec = PeriodSpec::recurring("2020-01-01", step, 10).unwrap();
        assert!(matches!(
            generate_period(&spec),
            Err(PeriodError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_overflow_aborts() {
        let spec = PeriodSpec::recurring("2020-01-01", dur("P100000Y"), 10_000).unwrap();
        assert!(matches!(
            generate_period(&spec),
            Err(PeriodError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_observer_sees_every_instant() {
        let spec = PeriodSpec::recurring("2020-01-01", dur("P1D"), 4).unwrap();
        let mut seen = Vec::new();
        let dates = generate_period_with(&spec, &mut |i: usize, instant: &Instant| {
            seen.push((i, *instant));
        })
        .unwrap();

        assert_eq!(seen.len(), dates.len());
        for (i, (idx, instant)) in seen.iter().enumerate() {
            assert_eq!(*idx, i);
            assert_eq!(*instant, dates[i]);
        }
    }

    #[test]
    fn test_time_delta_step() {
        let spec = PeriodSpec::recurring("2020-01-01", chrono::TimeDelta::minutes(90), 2).unwrap();
        assert_eq!(
            generate_period(&spec).unwrap(),
            vec![
                at("2020-01-01T00:00:00Z"),
                at("2020-01-01T01:30:00Z"),
                at("2020-01-01T03:00:00Z"),
            ]
        );
    }
}
