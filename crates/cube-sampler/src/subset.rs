//! Time-window subsetting of a correction cube.
//!
//! Subsetting is the one place the field is pulled into memory: the
//! requested calendar window is converted to cube hours, bracketed on the
//! time axis and the resulting slab materialized once. Spatial windows are
//! rejected.

use std::ops::Range;

use chrono::{NaiveDate, NaiveDateTime};
use ibe_common::{hours_between, IbeError, IbeResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cube::CorrectionCube;
use crate::error::Result;

/// An inclusive calendar time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> IbeResult<Self> {
        if start > end {
            return Err(IbeError::invalid_config(
                "subset.time",
                format!("window start {} is after end {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    /// 1 January of `first` through 31 December of `last`, 23:59:59.
    pub fn from_years(first: i32, last: i32) -> IbeResult<Self> {
        let bad_year = || IbeError::invalid_config("subset.time", format!("invalid year range {}..{}", first, last));
        let start = NaiveDate::from_ymd_opt(first, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(bad_year)?;
        let end = NaiveDate::from_ymd_opt(last, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .ok_or_else(bad_year)?;
        Self::new(start, end)
    }
}

/// A subset request against the cube.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeSubset {
    pub time: Option<TimeWindow>,
    /// Latitude bounds. Not supported.
    pub lat: Option<(f64, f64)>,
    /// Longitude bounds. Not supported.
    pub lon: Option<(f64, f64)>,
}

impl CubeSubset {
    /// A subset restricted to a time window.
    pub fn time(window: TimeWindow) -> Self {
        Self {
            time: Some(window),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_none() && self.lat.is_none() && self.lon.is_none()
    }

    /// Reject requests that cannot be honoured.
    pub fn validate(&self) -> IbeResult<()> {
        if self.lat.is_some() || self.lon.is_some() {
            return Err(IbeError::UnsupportedSubset(
                "spatial (lat/lon) subsetting is not implemented".to_string(),
            ));
        }
        if let Some(window) = &self.time {
            TimeWindow::new(window.start, window.end)?;
        }
        Ok(())
    }
}

/// Index range of `t_axis` covering `[start, end]` hours.
///
/// `t_axis` is ascending. Both bounds must lie within the axis.
pub fn time_index_range(t_axis: &[f64], start: f64, end: f64) -> IbeResult<Range<usize>> {
    let (first, last) = match (t_axis.first(), t_axis.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(IbeError::invalid_config("subset.time", "cube has an empty time axis")),
    };
    if start < first || end > last {
        return Err(IbeError::TimeWindowOutOfRange {
            start,
            end,
            first,
            last,
        });
    }

    let k1 = t_axis.partition_point(|&t| t < start);
    let k2 = t_axis.partition_point(|&t| t <= end);
    if k1 >= k2 {
        return Err(IbeError::invalid_config(
            "subset.time",
            format!("window {}..{} h contains no cube time step", start, end),
        ));
    }
    Ok(k1..k2)
}

/// Apply `subset` to `cube`, materializing the selected time steps.
///
/// An empty subset returns the cube untouched.
pub fn apply_subset(cube: CorrectionCube, subset: &CubeSubset) -> Result<CorrectionCube> {
    subset.validate()?;

    let Some(window) = subset.time else {
        return Ok(cube);
    };

    let start = hours_between(cube.time_epoch(), &window.start);
    let end = hours_between(cube.time_epoch(), &window.end);
    let range = time_index_range(cube.t_axis(), start, end)?;

    info!(
        window_start = %window.start,
        window_end = %window.end,
        first_index = range.start,
        last_index = range.end - 1,
        "Subsetting correction cube in time"
    );
    cube.restrict_time(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SamplerError;
    use ibe_common::Epoch;
    use test_utils::{create_index_cube, three_hourly_axis};

    fn datetime(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn day_cube() -> CorrectionCube {
        // 1900-01-01 00:00 .. 1900-01-02 21:00, 3-hourly
        CorrectionCube::from_array(
            three_hourly_axis(0.0, 16),
            vec![-60.0, -70.0],
            vec![0.0, 10.0],
            create_index_cube(16, 2, 2),
            Epoch::era_interim(),
        )
        .unwrap()
    }

    #[test]
    fn test_time_index_range_threshold_search() {
        let axis = [0.0, 3.0, 6.0, 9.0, 12.0];
        assert_eq!(time_index_range(&axis, 3.0, 9.0).unwrap(), 1..4);
        assert_eq!(time_index_range(&axis, 2.0, 10.0).unwrap(), 1..4);
        assert_eq!(time_index_range(&axis, 0.0, 12.0).unwrap(), 0..5);
    }

    #[test]
    fn test_time_index_range_out_of_cube() {
        let axis = [0.0, 3.0, 6.0];
        let err = time_index_range(&axis, -1.0, 3.0).unwrap_err();
        assert!(matches!(err, IbeError::TimeWindowOutOfRange { .. }));
        assert!(err.is_configuration_error());
        assert!(time_index_range(&axis, 0.0, 6.5).is_err());
    }

    #[test]
    fn test_time_index_range_between_samples() {
        assert!(time_index_range(&[0.0, 3.0], 1.0, 2.0).is_err());
    }

    #[test]
    fn test_from_years() {
        let window = TimeWindow::from_years(1990, 1991).unwrap();
        assert_eq!(window.start, datetime(1990, 1, 1, 0));
        assert_eq!(
            window.end,
            NaiveDate::from_ymd_opt(1991, 12, 31).unwrap().and_hms_opt(23, 59, 59).unwrap()
        );
        assert!(TimeWindow::from_years(1992, 1991).is_err());
    }

    #[test]
    fn test_apply_time_subset() {
        let window = TimeWindow::new(datetime(1900, 1, 1, 6), datetime(1900, 1, 1, 13)).unwrap();
        let cube = apply_subset(day_cube(), &CubeSubset::time(window)).unwrap();
        assert_eq!(cube.t_axis(), &[6.0, 9.0, 12.0]);
        assert_eq!(cube.dims(), [3, 2, 2]);

        let out = cube.sample_points(&[9.0], &[-70.0], &[10.0]).unwrap();
        assert_eq!(out, vec![30101.0]);
    }

    #[test]
    fn test_window_outside_cube_is_config_error() {
        let window = TimeWindow::from_years(1990, 1990).unwrap();
        let err = apply_subset(day_cube(), &CubeSubset::time(window)).unwrap_err();
        assert!(matches!(err, SamplerError::Config(IbeError::TimeWindowOutOfRange { .. })));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_spatial_subset_not_implemented() {
        let subset = CubeSubset {
            lat: Some((-80.0, -60.0)),
            ..Default::default()
        };
        let err = apply_subset(day_cube(), &subset).unwrap_err();
        assert!(matches!(err, SamplerError::Config(IbeError::UnsupportedSubset(_))));
    }

    #[test]
    fn test_empty_subset_is_noop() {
        let subset = CubeSubset::default();
        assert!(subset.is_empty());
        let cube = apply_subset(day_cube(), &subset).unwrap();
        assert_eq!(cube.dims(), [16, 2, 2]);
    }
}
