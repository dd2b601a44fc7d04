use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use serde::Deserialize;
use tracing::{debug, warn};

use fragtoprec::{FrameSet, Point, PointSource};

use crate::driver::FragToPrecerError;

/// The largest frame number accepted from a feature table. Frames are stored densely,
/// so every number below the largest one read gets a slot.
pub const MAX_FRAME_NUMBER: usize = 1 << 20;

/// One detected feature as written by the upstream feature finder
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeatureRow {
    pub frame: usize,
    #[serde(default)]
    pub coordinate: Option<f64>,
    #[serde(default)]
    pub mz: Option<f64>,
    #[serde(default)]
    pub rt: Option<f64>,
    #[serde(default)]
    pub intensity: Option<f32>,
    #[serde(default)]
    pub charge: Option<i32>,
}

impl PointSource for FeatureRow {
    fn source_mz(&self) -> Option<f64> {
        self.mz
    }

    fn source_time(&self) -> Option<f64> {
        self.rt
    }

    fn source_intensity(&self) -> Option<f32> {
        self.intensity
    }

    fn source_charge(&self) -> Option<i32> {
        self.charge
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Tab-separated for `.tsv` and `.tsv.gz`, comma-separated otherwise
pub fn infer_delimiter(path: &Path) -> u8 {
    let path = if is_gzipped(path) {
        Path::new(path.file_stem().unwrap_or_default())
    } else {
        path
    };
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

pub fn open_table(path: &Path) -> io::Result<Box<dyn Read>> {
    let handle = io::BufReader::new(fs::File::open(path)?);
    if is_gzipped(path) {
        Ok(Box::new(MultiGzDecoder::new(handle)))
    } else {
        Ok(Box::new(handle))
    }
}

/// Read a feature table, grouping rows into frames by their `frame` column.
///
/// Frames that do not appear in the table but lie below the largest frame number
/// are present and empty. Frame numbers above [`MAX_FRAME_NUMBER`] are rejected.
pub fn read_frames<R: Read>(reader: R, delimiter: u8) -> Result<FrameSet, FragToPrecerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut frames: Vec<(Option<f64>, Vec<Point>)> = Vec::new();
    let mut n_rows = 0usize;

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: FeatureRow = record.deserialize(Some(&headers))?;
        let point = Point::try_from_source(&row)
            .map_err(|source| FragToPrecerError::MalformedRow { line, source })?;

        if row.frame > MAX_FRAME_NUMBER {
            return Err(FragToPrecerError::FrameNumberOutOfRange {
                line,
                frame: row.frame,
                limit: MAX_FRAME_NUMBER,
            });
        }
        if frames.len() <= row.frame {
            frames.resize_with(row.frame + 1, Default::default);
        }
        let (coordinate, points) = &mut frames[row.frame];
        match (*coordinate, row.coordinate) {
            (None, Some(c)) => *coordinate = Some(c),
            (Some(prev), Some(c)) if prev != c => {
                warn!(
                    "Frame {} was given coordinate {c} on line {line} but was already at {prev}, keeping {prev}",
                    row.frame
                );
            }
            _ => {}
        }
        points.push(point);
        n_rows += 1;
    }

    debug!("Read {n_rows} rows into {} frames", frames.len());
    Ok(frames
        .into_iter()
        .enumerate()
        .map(|(i, (coordinate, points))| (coordinate.unwrap_or(i as f64), points))
        .collect())
}

pub fn read_frames_from_path(path: &Path) -> Result<FrameSet, FragToPrecerError> {
    let reader = open_table(path)?;
    read_frames(reader, infer_delimiter(path))
}
