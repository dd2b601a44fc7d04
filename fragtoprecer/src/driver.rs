use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Instant;

use clap::Parser;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use fragtoprec::linker::{DEFAULT_EPSILON, DEFAULT_MAX_SKIPPED_FRAMES};
use fragtoprec::{
    interleaved_order, link_between_frames, search_through_frames, strided_targets, FrameSet,
    IdCounter, LinkingError, LinkingParams,
};

use crate::args::{non_negative_float, Mode};
use crate::frame_range::FrameRange;
use crate::input::read_frames_from_path;
use crate::progress::ProgressRecord;
use crate::write::{write_precursors, write_species};

#[derive(Debug, Error)]
pub enum FragToPrecerError {
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
    #[error("Failed to read the feature table: {0}")]
    CSVError(#[from] csv::Error),
    #[error("Malformed feature on line {line}: {source}")]
    MalformedRow {
        line: u64,
        #[source]
        source: LinkingError,
    },
    #[error("Malformed feature on line {line}: frame number {frame} exceeds the limit of {limit}")]
    FrameNumberOutOfRange { line: u64, frame: usize, limit: usize },
    #[error(transparent)]
    LinkingError(#[from] LinkingError),
    #[error("Failed to write output: {0}")]
    JSONError(#[from] serde_json::Error),
    #[error("Failed to read the configuration: {0}")]
    ConfigurationError(#[from] figment::Error),
    #[error("Failed to build the thread pool: {0}")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),
}

/// Link LC-IMS-MS features across frames into species and group later-frame
/// features under precursor frames.
///
/// Read a table of detected features, one row per feature tagged with its frame
/// number, and write `species.json` and/or `precursors.json` to the output directory.
#[derive(Parser, Debug, Clone, PartialEq, Deserialize, Serialize)]
#[command(author, version)]
#[serde(default)]
pub struct FragToPrecer {
    /// The feature table to read, comma-separated or tab-separated if the
    /// extension is `.tsv`, optionally gzip compressed
    #[arg()]
    pub input_file: PathBuf,

    /// The directory to write the results to
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// The path to write a log file to, in addition to STDERR
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// A TOML configuration file to read additional parameters from.
    ///
    /// Configurations are also read from `fragtoprecer.toml` in the working directory.
    /// Environment variables prefixed with `FRAGTOPRECER_` will be read too, and
    /// override both files. Options given on the command line override all three.
    #[arg(long = "config-file")]
    pub config_file: Option<PathBuf>,

    /// The number of threads to use, passing a value < 1 to use all available threads
    #[arg(
        short='t',
        long="threads",
        default_value_t=-1,
    )]
    pub threads: i32,

    /// Whether to link species, search for precursor matches, or both
    #[arg(short = 'm', long = "mode", default_value = "both")]
    pub mode: Mode,

    /// The m/z tolerance for two points to match
    #[arg(
        long = "mz-tolerance",
        default_value_t = DEFAULT_EPSILON,
        value_parser = non_negative_float
    )]
    pub mz_tolerance: f64,

    /// The tolerance on the within-frame time axis for two points to match
    #[arg(
        long = "time-tolerance",
        default_value_t = DEFAULT_EPSILON,
        value_parser = non_negative_float
    )]
    pub time_tolerance: f64,

    /// The number of consecutive frames without a match a species may step over
    #[arg(long = "max-skipped-frames", default_value_t = DEFAULT_MAX_SKIPPED_FRAMES)]
    pub max_skipped_frames: usize,

    /// The length of the frame acquisition cycle.
    ///
    /// Frames are linked phase by phase, `0, stride, 2 * stride, ..., 1, 1 + stride, ...`,
    /// and unless `--targets` is given every `stride`-th frame is a precursor target.
    #[arg(short = 's', long = "stride", default_value_t = 1)]
    pub stride: usize,

    /// The frames to search for precursor matches from, overriding `--stride`.
    ///
    /// Indices count from the first frame selected by `--frame-range`.
    #[arg(long = "targets", value_delimiter = ',', num_args = 1..)]
    pub targets: Vec<usize>,

    /// The frames to process, denoted (start?)-(end?)
    #[arg(
        short='r',
        long="frame-range",
        value_parser=FrameRange::from_str,
        value_name="BEGIN-END",
        long_help=r#"The frames to process, denoted (start?)-(end?), inclusive

If a start is not specified, processing begins from the first frame.
If an end is not specified, processing stops at the last frame.
"#
    )]
    pub frame_range: Option<FrameRange>,
}

impl Default for FragToPrecer {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            output_dir: PathBuf::from("."),
            log_file: None,
            config_file: None,
            threads: -1,
            mode: Mode::default(),
            mz_tolerance: DEFAULT_EPSILON,
            time_tolerance: DEFAULT_EPSILON,
            max_skipped_frames: DEFAULT_MAX_SKIPPED_FRAMES,
            stride: 1,
            targets: Vec::new(),
            frame_range: None,
        }
    }
}

impl FragToPrecer {
    fn create_threadpool(&self) -> Result<rayon::ThreadPool, FragToPrecerError> {
        let num_threads = if self.threads > 0 {
            self.threads as usize
        } else {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        };
        debug!("Using {} cores", num_threads);
        Ok(rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()?)
    }

    pub fn linking_params(&self) -> LinkingParams {
        LinkingParams::new(
            self.mz_tolerance,
            self.time_tolerance,
            self.max_skipped_frames,
        )
    }

    /// The frames the precursor search starts from, given `total` frames
    pub fn target_frames(&self, total: usize) -> Vec<usize> {
        if self.targets.is_empty() {
            strided_targets(total, self.stride.max(1))
        } else {
            self.targets.clone()
        }
    }

    fn select_frames(&self, frames: FrameSet) -> Result<FrameSet, FragToPrecerError> {
        match self.frame_range {
            Some(range) => {
                info!("Restricting to frames {range}");
                Ok(frames.reordered(&range.indices(frames.len()))?)
            }
            None => Ok(frames),
        }
    }

    pub fn main(&self) -> Result<ProgressRecord, FragToPrecerError> {
        info!(
            "fragtoprecer v{}",
            option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
        );
        info!("Input: {}", self.input_file.display());
        info!("Output: {}", self.output_dir.display());
        self.create_threadpool()?.install(|| self.run_workflow())
    }

    fn run_workflow(&self) -> Result<ProgressRecord, FragToPrecerError> {
        let start = Instant::now();
        let frames = self.select_frames(read_frames_from_path(&self.input_file)?)?;
        let mut prog = ProgressRecord {
            frames: frames.len(),
            points: frames.remaining(),
            ..Default::default()
        };
        info!("Frames: {} | Points: {}", prog.frames, prog.points);

        fs::create_dir_all(&self.output_dir)?;
        let params = self.linking_params();

        if self.mode.links() {
            let order = interleaved_order(frames.len(), self.stride);
            let mut working = frames.reordered(&order)?;
            let mut ids = IdCounter::default();
            let report = link_between_frames(&mut working, &params, &mut ids)?;
            let step = ProgressRecord::from_linking(&report);
            info!(
                "Species: {} | Singletons: {} | Passes: {}",
                step.species, step.singletons, step.linking_passes
            );
            write_species(&self.output_dir, &report)?;
            prog += step;
        }

        if self.mode.searches() {
            let targets = self.target_frames(frames.len());
            debug!("Target frames: {}", targets.iter().join(", "));
            let mut ids = IdCounter::default();
            let report = search_through_frames(&frames, &targets, &params, &mut ids)?;
            let step = ProgressRecord::from_search(&report);
            info!(
                "Precursor Groups: {} | Matches: {}",
                step.precursor_groups, step.precursor_matches
            );
            write_precursors(&self.output_dir, &report)?;
            prog += step;
        }

        let elapsed = Instant::now() - start;
        info!("Elapsed Time: {:0.3?}", elapsed);
        Ok(prog)
    }
}
