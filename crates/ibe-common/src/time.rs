//! Epoch handling for altimetry time stamps and cube time axes.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{IbeError, IbeResult};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// A calendar instant used as the zero-point of an elapsed-time axis.
///
/// Built from the six integers `(Y, M, D, h, m, s)`; invalid dates are
/// rejected at construction so that conversions never fail afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i32; 6]", into = "[i32; 6]")]
pub struct Epoch {
    datetime: NaiveDateTime,
}

impl Epoch {
    /// Create an epoch from calendar components.
    pub fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> IbeResult<Self> {
        let parts = [year, month, day, hour, minute, second];
        let as_u32 = |v: i32| u32::try_from(v).map_err(|_| IbeError::InvalidEpoch(parts));

        let date = NaiveDate::from_ymd_opt(year, as_u32(month)?, as_u32(day)?)
            .ok_or(IbeError::InvalidEpoch(parts))?;
        let datetime = date
            .and_hms_opt(as_u32(hour)?, as_u32(minute)?, as_u32(second)?)
            .ok_or(IbeError::InvalidEpoch(parts))?;

        Ok(Self { datetime })
    }

    /// Unix epoch, the default reference of altimetry `t_sec` fields.
    pub fn unix() -> Self {
        Self::from_datetime(midnight(1970, 1, 1))
    }

    /// 1900-01-01, the reference of ERA-Interim derived cubes.
    pub fn era_interim() -> Self {
        Self::from_datetime(midnight(1900, 1, 1))
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self { datetime }
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    /// Calendar components `(Y, M, D, h, m, s)`.
    pub fn parts(&self) -> [i32; 6] {
        let dt = self.datetime;
        [
            dt.year(),
            dt.month() as i32,
            dt.day() as i32,
            dt.hour() as i32,
            dt.minute() as i32,
            dt.second() as i32,
        ]
    }

    /// Signed seconds from `self` to `other`.
    pub fn seconds_until(&self, other: &Epoch) -> f64 {
        (other.datetime - self.datetime).num_seconds() as f64
    }
}

impl TryFrom<[i32; 6]> for Epoch {
    type Error = IbeError;

    fn try_from(p: [i32; 6]) -> Result<Self, Self::Error> {
        Epoch::new(p[0], p[1], p[2], p[3], p[4], p[5])
    }
}

impl From<Epoch> for [i32; 6] {
    fn from(epoch: Epoch) -> Self {
        epoch.parts()
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Convert seconds since `from` into hours since `to`.
///
/// `hours = (secs - (to - from)) / 3600`. No range checks: observations
/// before `to` simply come out negative.
pub fn secs_to_hours(secs: &[f64], from: &Epoch, to: &Epoch) -> Vec<f64> {
    let secs_btw_epochs = from.seconds_until(to);
    secs.iter()
        .map(|s| (s - secs_btw_epochs) / SECONDS_PER_HOUR)
        .collect()
}

/// Signed hours from `epoch` to `instant`.
pub fn hours_between(epoch: &Epoch, instant: &NaiveDateTime) -> f64 {
    (*instant - epoch.datetime).num_seconds() as f64 / SECONDS_PER_HOUR
}

/// Unit of a CF `"<unit> since <date>"` time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Multiplier converting a value in this unit to hours.
    pub fn hours_factor(&self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0 / 3600.0,
            TimeUnit::Minutes => 1.0 / 60.0,
            TimeUnit::Hours => 1.0,
            TimeUnit::Days => 24.0,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = IbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(TimeUnit::Seconds),
            "min" | "mins" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(TimeUnit::Hours),
            "d" | "day" | "days" => Ok(TimeUnit::Days),
            other => Err(IbeError::InvalidTimeUnits(format!("unknown unit '{}'", other))),
        }
    }
}

/// Parsed CF time units, e.g. `hours since 1900-01-01 00:00:0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfTimeUnits {
    pub unit: TimeUnit,
    pub epoch: Epoch,
}

impl CfTimeUnits {
    pub fn parse(s: &str) -> IbeResult<Self> {
        let (unit, reference) = s
            .split_once(" since ")
            .ok_or_else(|| IbeError::InvalidTimeUnits(s.to_string()))?;

        let unit = unit.trim().parse::<TimeUnit>()?;
        let epoch = parse_reference_date(reference.trim())
            .ok_or_else(|| IbeError::InvalidTimeUnits(s.to_string()))?;

        Ok(Self { unit, epoch })
    }
}

impl FromStr for CfTimeUnits {
    type Err = IbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CfTimeUnits::parse(s)
    }
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_default()
        .and_time(Default::default())
}

fn parse_reference_date(s: &str) -> Option<Epoch> {
    // Drop a trailing zone designator; cube epochs are always UTC.
    let s = s.trim_end_matches('Z').trim_end_matches(" UTC").trim();

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Epoch::from_datetime(dt));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| Epoch::from_datetime(d.and_time(Default::default())))
}
