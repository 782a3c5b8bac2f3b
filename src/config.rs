//! TOML configuration of named periods and intervals.
//!
//! ```toml
//! [periods.billing]
//! start = "2020-01-01"
//! duration = "P1M"
//! end = "2021-01-01"
//!
//! [periods.backups]
//! iso = "R6/2020-01-01T00:00:00Z/PT4H"
//!
//! [intervals]
//! freeze = "2020-12-20/P14D"
//! ```
//!
//! Entries are kept as written and validated on resolution, so a bad entry
//! reports the same typed error it would through the direct API.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Instant, Interval};
use crate::period::{generate_period, PeriodRequest, PeriodSpec};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Named period requests.
    pub periods: BTreeMap<String, PeriodRequest>,
    /// Named `<start>/<end>` range strings.
    pub intervals: BTreeMap<String, String>,
}

impl TimeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            periods = config.periods.len(),
            intervals = config.intervals.len(),
            "loaded time config"
        );
        Ok(config)
    }

    /// Validated spec of a named period, or `None` if no such entry exists.
    pub fn period_spec(&self, name: &str) -> Option<Result<PeriodSpec>> {
        self.periods.get(name).map(PeriodRequest::resolve)
    }

    /// Generated instants of a named period, or `None` if no such entry exists.
    pub fn period(&self, name: &str) -> Option<Result<Vec<Instant>>> {
        self.period_spec(name)
            .map(|spec| spec.and_then(|spec| generate_period(&spec)))
    }

    /// A named interval, or `None` if no such entry exists.
    pub fn interval(&self, name: &str) -> Option<Result<Interval>> {
        self.intervals.get(name).map(|range| Interval::parse(range))
    }

    /// Generates every configured period, failing on the first bad entry.
    pub fn resolve_periods(&self) -> Result<BTreeMap<String, Vec<Instant>>> {
        self.periods
            .iter()
            .map(|(name, request)| {
                debug!(name = %name, "resolving period");
                let dates = generate_period(&request.resolve()?)?;
                Ok((name.clone(), dates))
            })
            .collect()
    }

    /// Parses every configured interval, failing on the first bad entry.
    pub fn resolve_intervals(&self) -> Result<BTreeMap<String, Interval>> {
        self.intervals
            .iter()
            .map(|(name, range)| Ok((name.clone(), Interval::parse(range)?)))
            .collect()
    }
}
