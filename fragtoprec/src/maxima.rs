use itertools::Itertools;

use crate::frame::FrameSet;

/// A frame whose most intense remaining point is more intense than the most intense
/// remaining points of both of its neighbors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalMaximum {
    pub frame_index: usize,
    /// The slot of the most intense point within the frame
    pub point_index: usize,
    pub intensity: f32,
}

/// The slot and intensity of the most intense remaining point in each frame, or
/// `(0, 0.0)` for frames with nothing left.
pub fn frame_apexes(frames: &FrameSet) -> Vec<(usize, f32)> {
    frames
        .iter()
        .map(|f| {
            f.most_intense()
                .map(|(i, p)| (i, p.intensity))
                .unwrap_or((0, 0.0))
        })
        .collect()
}

/// Treat the per-frame apex intensities as a signal over frame index and find every
/// strict local maximum. The first and last frames are never maxima.
///
/// The apexes are computed eagerly from the current state of `frames`; the returned
/// iterator owns them, so the search must be repeated after points are consumed.
pub fn find_local_maxima(frames: &FrameSet) -> impl Iterator<Item = LocalMaximum> {
    frame_apexes(frames)
        .into_iter()
        .enumerate()
        .tuple_windows()
        .filter_map(|((_, (_, before)), (frame_index, (point_index, intensity)), (_, (_, after)))| {
            if intensity > before && intensity > after {
                Some(LocalMaximum {
                    frame_index,
                    point_index,
                    intensity,
                })
            } else {
                None
            }
        })
}
