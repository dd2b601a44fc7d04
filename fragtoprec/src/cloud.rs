//! A flat collection of `(mz, drift time, rt, intensity)` points supporting
//! axis-aligned bounding box queries.
use std::cell::OnceCell;

use mzpeaks::{prelude::*, IonMobility, Time, MZ};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CloudAxis, LinkingError};

#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CloudPoint {
    pub mz: f64,
    pub dt: f64,
    pub rt: f64,
    pub intensity: f32,
}

impl CloudPoint {
    pub fn new(mz: f64, dt: f64, rt: f64, intensity: f32) -> Self {
        Self {
            mz,
            dt,
            rt,
            intensity,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.mz, self.dt, self.rt, self.intensity as f64]
    }
}

impl From<(f64, f64, f64, f32)> for CloudPoint {
    fn from(value: (f64, f64, f64, f32)) -> Self {
        Self::new(value.0, value.1, value.2, value.3)
    }
}

impl CoordinateLike<MZ> for CloudPoint {
    fn coordinate(&self) -> f64 {
        self.mz
    }
}

impl CoordinateLike<IonMobility> for CloudPoint {
    fn coordinate(&self) -> f64 {
        self.dt
    }
}

impl CoordinateLike<Time> for CloudPoint {
    fn coordinate(&self) -> f64 {
        self.rt
    }
}

impl IntensityMeasurement for CloudPoint {
    fn intensity(&self) -> f32 {
        self.intensity
    }
}

fn check_bound(axis: CloudAxis, lower: f64, upper: f64) -> Result<(), LinkingError> {
    if lower.is_finite() && upper.is_finite() && lower <= upper {
        Ok(())
    } else {
        Err(LinkingError::InvalidBoundingBox { axis, lower, upper })
    }
}

#[inline]
fn within(value: f64, lower: f64, upper: f64) -> bool {
    lower <= value && value <= upper
}

/// An unordered point collection with a lazily built array view.
///
/// The array view is computed on first use and kept until the points are replaced
/// with [`PointCloud::set_data`].
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointCloud {
    points: Vec<CloudPoint>,
    #[cfg_attr(feature = "serde", serde(skip))]
    array: OnceCell<Vec<[f64; 4]>>,
}

impl PartialEq for PointCloud {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl PointCloud {
    pub fn new(points: Vec<CloudPoint>) -> Self {
        Self {
            points,
            array: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CloudPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CloudPoint> {
        self.points.iter()
    }

    /// Replace the points held, discarding the cached array view
    pub fn set_data(&mut self, points: Vec<CloudPoint>) {
        self.points = points;
        self.array = OnceCell::new();
    }

    /// Each point as `[mz, dt, rt, intensity]`
    pub fn as_array(&self) -> &[[f64; 4]] {
        self.array
            .get_or_init(|| self.points.iter().map(CloudPoint::as_array).collect())
    }

    /// Whether the array view has been built yet
    pub fn is_cached(&self) -> bool {
        self.array.get().is_some()
    }

    /// Select the points whose m/z and drift time both lie within the inclusive box
    /// spanning `lower_left` to `upper_right`, each given as `[mz, dt]`.
    pub fn bounded_by_mz_dt(
        &self,
        lower_left: [f64; 2],
        upper_right: [f64; 2],
    ) -> Result<Vec<[f64; 4]>, LinkingError> {
        check_bound(CloudAxis::MZ, lower_left[0], upper_right[0])?;
        check_bound(CloudAxis::DriftTime, lower_left[1], upper_right[1])?;
        Ok(self
            .as_array()
            .iter()
            .filter(|p| {
                within(p[0], lower_left[0], upper_right[0])
                    && within(p[1], lower_left[1], upper_right[1])
            })
            .copied()
            .collect())
    }

    /// As [`PointCloud::bounded_by_mz_dt`] with retention time as a third axis,
    /// bounds given as `[mz, dt, rt]`.
    pub fn bounded_by_mz_dt_rt(
        &self,
        lower_left: [f64; 3],
        upper_right: [f64; 3],
    ) -> Result<Vec<[f64; 4]>, LinkingError> {
        check_bound(CloudAxis::MZ, lower_left[0], upper_right[0])?;
        check_bound(CloudAxis::DriftTime, lower_left[1], upper_right[1])?;
        check_bound(CloudAxis::Time, lower_left[2], upper_right[2])?;
        Ok(self
            .as_array()
            .iter()
            .filter(|p| (0..3).all(|axis| within(p[axis], lower_left[axis], upper_right[axis])))
            .copied()
            .collect())
    }
}

impl FromIterator<CloudPoint> for PointCloud {
    fn from_iter<T: IntoIterator<Item = CloudPoint>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<CloudPoint>> for PointCloud {
    fn from(value: Vec<CloudPoint>) -> Self {
        Self::new(value)
    }
}
