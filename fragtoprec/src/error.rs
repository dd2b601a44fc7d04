use thiserror::Error;

/// The point fields an upstream feature must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointField {
    MZ,
    Time,
    Intensity,
    Charge,
}

impl std::fmt::Display for PointField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PointField::MZ => "mz",
            PointField::Time => "rt",
            PointField::Intensity => "intensity",
            PointField::Charge => "charge",
        };
        f.write_str(name)
    }
}

/// The axes a [`PointCloud`](crate::cloud::PointCloud) can be bounded on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudAxis {
    MZ,
    DriftTime,
    Time,
}

impl std::fmt::Display for CloudAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CloudAxis::MZ => "mz",
            CloudAxis::DriftTime => "drift time",
            CloudAxis::Time => "rt",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkingError {
    #[error("Upstream feature is missing a usable {field} value ({reason})")]
    MalformedUpstreamData { field: PointField, reason: String },
    #[error("Frame index {index} is out of bounds for a run with {frame_count} frames")]
    FrameOutOfBounds { index: usize, frame_count: usize },
    #[error("Point slot {point_index} does not exist in frame {frame_index}")]
    SeedOutOfBounds {
        frame_index: usize,
        point_index: usize,
    },
    #[error("Invalid bounding box on the {axis} axis: lower bound {lower} is not <= upper bound {upper}")]
    InvalidBoundingBox {
        axis: CloudAxis,
        lower: f64,
        upper: f64,
    },
}

impl LinkingError {
    pub fn missing(field: PointField) -> Self {
        Self::MalformedUpstreamData {
            field,
            reason: "value absent".to_string(),
        }
    }

    pub fn not_finite(field: PointField, value: f64) -> Self {
        Self::MalformedUpstreamData {
            field,
            reason: format!("{value} is not a finite number"),
        }
    }
}
