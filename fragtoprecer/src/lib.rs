mod args;
mod driver;
mod frame_range;
mod input;
mod progress;
mod write;

pub use args::*;
pub use driver::{FragToPrecer, FragToPrecerError};
pub use frame_range::{FrameRange, FrameRangeParseError};
pub use input::{read_frames, read_frames_from_path, FeatureRow, MAX_FRAME_NUMBER};
pub use progress::ProgressRecord;
pub use write::{PRECURSORS_FILE, SPECIES_FILE};
