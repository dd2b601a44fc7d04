//! The uniform point representation consumed by the linking and search algorithms,
//! and the adapter that maps upstream feature-detection output onto it.

use mzpeaks::{
    feature::{ChargedFeature, TimeInterval},
    prelude::*,
    IonMobility, Time, MZ,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LinkingError, PointField};

/// A detected feature centroid within a single frame.
///
/// `rt` is the coordinate of the feature along the axis *within* the frame, which is
/// retention time or ion mobility depending upon how the frames were sliced.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub mz: f64,
    pub rt: f64,
    pub intensity: f32,
    pub charge: i32,
}

impl Point {
    pub fn new(mz: f64, rt: f64, intensity: f32, charge: i32) -> Self {
        Self {
            mz,
            rt,
            intensity,
            charge,
        }
    }

    /// Build a [`Point`] from an upstream feature, failing if any field is absent
    /// or not a finite number.
    pub fn try_from_source<S: PointSource + ?Sized>(source: &S) -> Result<Self, LinkingError> {
        let mz = finite(source.source_mz(), PointField::MZ)?;
        let rt = finite(source.source_time(), PointField::Time)?;
        let intensity = finite(
            source.source_intensity().map(|i| i as f64),
            PointField::Intensity,
        )? as f32;
        let charge = source
            .source_charge()
            .ok_or_else(|| LinkingError::missing(PointField::Charge))?;
        Ok(Self::new(mz, rt, intensity, charge))
    }

    /// Test whether `other` lies within the inclusive `mz_tolerance` and `time_tolerance`
    /// windows centered on this point. Charge and intensity are not considered.
    #[inline]
    pub fn is_near(&self, other: &Point, mz_tolerance: f64, time_tolerance: f64) -> bool {
        self.mz - mz_tolerance <= other.mz
            && other.mz <= self.mz + mz_tolerance
            && self.rt - time_tolerance <= other.rt
            && other.rt <= self.rt + time_tolerance
    }
}

fn finite(value: Option<f64>, field: PointField) -> Result<f64, LinkingError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(LinkingError::not_finite(field, v)),
        None => Err(LinkingError::missing(field)),
    }
}

impl From<(f64, f64, f32, i32)> for Point {
    fn from(value: (f64, f64, f32, i32)) -> Self {
        Self::new(value.0, value.1, value.2, value.3)
    }
}

impl CoordinateLike<MZ> for Point {
    fn coordinate(&self) -> f64 {
        self.mz
    }
}

impl CoordinateLike<Time> for Point {
    fn coordinate(&self) -> f64 {
        self.rt
    }
}

impl IntensityMeasurement for Point {
    fn intensity(&self) -> f32 {
        self.intensity
    }
}

impl KnownCharge for Point {
    fn charge(&self) -> i32 {
        self.charge
    }
}

/// Anything an external feature finder produces that can be mapped onto a [`Point`].
///
/// Every accessor is optional so that adapters over loosely-typed sources can report
/// a missing value instead of inventing a default for it.
pub trait PointSource {
    fn source_mz(&self) -> Option<f64>;
    fn source_time(&self) -> Option<f64>;
    fn source_intensity(&self) -> Option<f32>;
    fn source_charge(&self) -> Option<i32>;
}

impl PointSource for Point {
    fn source_mz(&self) -> Option<f64> {
        Some(self.mz)
    }

    fn source_time(&self) -> Option<f64> {
        Some(self.rt)
    }

    fn source_intensity(&self) -> Option<f32> {
        Some(self.intensity)
    }

    fn source_charge(&self) -> Option<i32> {
        Some(self.charge)
    }
}

impl<T: PointSource> PointSource for &T {
    fn source_mz(&self) -> Option<f64> {
        (*self).source_mz()
    }

    fn source_time(&self) -> Option<f64> {
        (*self).source_time()
    }

    fn source_intensity(&self) -> Option<f32> {
        (*self).source_intensity()
    }

    fn source_charge(&self) -> Option<i32> {
        (*self).source_charge()
    }
}

macro_rules! impl_point_source_for_feature {
    ($time:ty) => {
        impl PointSource for ChargedFeature<MZ, $time> {
            fn source_mz(&self) -> Option<f64> {
                Some(<Self as CoordinateLike<MZ>>::coordinate(self))
            }

            fn source_time(&self) -> Option<f64> {
                <Self as TimeInterval<$time>>::apex_time(self)
            }

            fn source_intensity(&self) -> Option<f32> {
                Some(<Self as IntensityMeasurement>::intensity(self))
            }

            fn source_charge(&self) -> Option<i32> {
                Some(<Self as KnownCharge>::charge(self))
            }
        }
    };
}

impl_point_source_for_feature!(Time);
impl_point_source_for_feature!(IonMobility);

#[cfg(test)]
mod test {
    use super::*;

    struct PartialFeature {
        mz: Option<f64>,
        time: Option<f64>,
        intensity: Option<f32>,
        charge: Option<i32>,
    }

    impl PointSource for PartialFeature {
        fn source_mz(&self) -> Option<f64> {
            self.mz
        }

        fn source_time(&self) -> Option<f64> {
            self.time
        }

        fn source_intensity(&self) -> Option<f32> {
            self.intensity
        }

        fn source_charge(&self) -> Option<i32> {
            self.charge
        }
    }

    #[test]
    fn test_is_near_inclusive() {
        let a = Point::new(100.0, 1.0, 10.0, 1);
        assert!(a.is_near(&Point::new(100.002, 1.002, 5.0, 2), 0.003, 0.003));
        assert!(a.is_near(&Point::new(100.0, 1.0, 5.0, 1), 0.0, 0.0));
        assert!(!a.is_near(&Point::new(100.004, 1.0, 5.0, 1), 0.003, 0.003));
        assert!(!a.is_near(&Point::new(100.0, 0.996, 5.0, 1), 0.003, 0.003));
        assert!(a.is_near(&Point::new(100.0, 0.996, 5.0, 1), 0.003, 0.005));
    }

    #[test]
    fn test_from_source() -> Result<(), LinkingError> {
        let src = PartialFeature {
            mz: Some(500.25),
            time: Some(0.85),
            intensity: Some(1200.0),
            charge: Some(2),
        };
        let p = Point::try_from_source(&src)?;
        assert_eq!(p, Point::new(500.25, 0.85, 1200.0, 2));
        assert_eq!(p.charge(), 2);
        assert_eq!(p.intensity(), 1200.0);
        assert_eq!(CoordinateLike::<MZ>::coordinate(&p), 500.25);
        assert_eq!(CoordinateLike::<Time>::coordinate(&p), 0.85);
        Ok(())
    }

    #[test]
    fn test_from_source_malformed() {
        let src = PartialFeature {
            mz: Some(500.25),
            time: None,
            intensity: Some(1200.0),
            charge: Some(2),
        };
        match Point::try_from_source(&src) {
            Err(LinkingError::MalformedUpstreamData { field, .. }) => {
                assert_eq!(field, PointField::Time)
            }
            other => panic!("Expected a malformed data error, got {other:?}"),
        }

        let src = PartialFeature {
            mz: Some(f64::NAN),
            time: Some(1.0),
            intensity: Some(1200.0),
            charge: Some(2),
        };
        match Point::try_from_source(&src) {
            Err(LinkingError::MalformedUpstreamData { field, .. }) => {
                assert_eq!(field, PointField::MZ)
            }
            other => panic!("Expected a malformed data error, got {other:?}"),
        }

        let src = PartialFeature {
            mz: Some(500.0),
            time: Some(1.0),
            intensity: Some(1200.0),
            charge: None,
        };
        assert!(matches!(
            Point::try_from_source(&src),
            Err(LinkingError::MalformedUpstreamData {
                field: PointField::Charge,
                ..
            })
        ));
    }

    #[test]
    fn test_from_charged_feature() -> Result<(), LinkingError> {
        let mut feature: ChargedFeature<MZ, Time> = ChargedFeature::empty(3);
        feature.push_raw(750.5, 12.0, 100.0);
        let p = Point::try_from_source(&feature)?;
        assert_eq!(p.mz, 750.5);
        assert_eq!(p.rt, 12.0);
        assert_eq!(p.charge, 3);
        Ok(())
    }
}
