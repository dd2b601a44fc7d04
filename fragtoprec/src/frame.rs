//! Per-frame working lists of [`Point`]s.
//!
//! A [`Frame`] holds the points detected in one slice of the run. Points are
//! consumed by tombstoning their slot, so slot indices stay stable for the
//! lifetime of the frame and scans visit the surviving points in their original
//! order. A frame never gains points after it is built.

use std::ops::{Index, IndexMut};

use crate::error::LinkingError;
use crate::point::{Point, PointSource};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    coordinate: f64,
    slots: Vec<Option<Point>>,
    remaining: usize,
}

impl Frame {
    pub fn new(coordinate: f64, points: Vec<Point>) -> Self {
        let remaining = points.len();
        Self {
            coordinate,
            slots: points.into_iter().map(Some).collect(),
            remaining,
        }
    }

    pub fn empty(coordinate: f64) -> Self {
        Self::new(coordinate, Vec::new())
    }

    /// Build a frame from upstream features, failing on the first malformed one
    pub fn try_from_sources<I, S>(coordinate: f64, sources: I) -> Result<Self, LinkingError>
    where
        I: IntoIterator<Item = S>,
        S: PointSource,
    {
        let points = sources
            .into_iter()
            .map(|s| Point::try_from_source(&s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(coordinate, points))
    }

    /// The physical coordinate (retention time, ion mobility bin, frame number, ...)
    /// this frame was sliced at
    pub fn coordinate(&self) -> f64 {
        self.coordinate
    }

    /// The number of points not yet consumed
    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// The number of slots, consumed or not
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: usize) -> Option<&Point> {
        self.slots.get(slot).and_then(|p| p.as_ref())
    }

    /// Iterate over the remaining points in slot order along with their slot index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Point)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.slots.iter().flatten()
    }

    /// Remove the point at `slot` from the working list
    pub fn take(&mut self, slot: usize) -> Option<Point> {
        let point = self.slots.get_mut(slot).and_then(|p| p.take());
        if point.is_some() {
            self.remaining -= 1;
        }
        point
    }

    /// The first remaining point with the greatest intensity. Ties are resolved
    /// in favor of the earliest slot.
    pub fn most_intense(&self) -> Option<(usize, &Point)> {
        let mut best: Option<(usize, &Point)> = None;
        for (i, p) in self.iter() {
            match best {
                Some((_, b)) if p.intensity <= b.intensity => {}
                _ => best = Some((i, p)),
            }
        }
        best
    }

    /// Find the slot of the first remaining point satisfying `predicate`
    pub fn find_first<F: FnMut(&Point) -> bool>(&self, mut predicate: F) -> Option<usize> {
        self.iter().find(|(_, p)| predicate(p)).map(|(i, _)| i)
    }
}

/// An index-addressed arena of [`Frame`]s ordered along the linking axis
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameSet {
    frames: Vec<Frame>,
}

impl FrameSet {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Build a frame set from `(coordinate, features)` pairs produced by an external
    /// feature finder.
    pub fn try_from_sources<I, J, S>(frames: I) -> Result<Self, LinkingError>
    where
        I: IntoIterator<Item = (f64, J)>,
        J: IntoIterator<Item = S>,
        S: PointSource,
    {
        let frames = frames
            .into_iter()
            .map(|(coordinate, sources)| Frame::try_from_sources(coordinate, sources))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }

    pub fn coordinates(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.coordinate()).collect()
    }

    /// The total number of points not yet consumed across all frames
    pub fn remaining(&self) -> usize {
        self.frames.iter().map(|f| f.len()).sum()
    }

    pub fn has_remaining(&self) -> bool {
        self.frames.iter().any(|f| !f.is_empty())
    }

    pub fn check_index(&self, index: usize) -> Result<(), LinkingError> {
        if index < self.frames.len() {
            Ok(())
        } else {
            Err(LinkingError::FrameOutOfBounds {
                index,
                frame_count: self.frames.len(),
            })
        }
    }

    /// Build a new frame set visiting this one's frames in `order`. Each frame keeps its
    /// coordinate, so the original position remains recoverable.
    pub fn reordered(&self, order: &[usize]) -> Result<Self, LinkingError> {
        let frames = order
            .iter()
            .map(|i| {
                self.frames
                    .get(*i)
                    .cloned()
                    .ok_or(LinkingError::FrameOutOfBounds {
                        index: *i,
                        frame_count: self.frames.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(frames))
    }
}

impl FromIterator<(f64, Vec<Point>)> for FrameSet {
    fn from_iter<T: IntoIterator<Item = (f64, Vec<Point>)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(coordinate, points)| Frame::new(coordinate, points))
                .collect(),
        )
    }
}

impl FromIterator<Frame> for FrameSet {
    fn from_iter<T: IntoIterator<Item = Frame>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for FrameSet {
    type Output = Frame;

    fn index(&self, index: usize) -> &Self::Output {
        &self.frames[index]
    }
}

impl IndexMut<usize> for FrameSet {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.frames[index]
    }
}

/// The order in which frames acquired in an interleaved cycle of length `stride`
/// are visited so that each phase of the cycle is contiguous: `0, stride, 2 * stride, ...,
/// 1, 1 + stride, ...`.
///
/// A `stride` of 0 or 1 is the natural order.
pub fn interleaved_order(total: usize, stride: usize) -> Vec<usize> {
    if stride <= 1 {
        return (0..total).collect();
    }
    (0..stride.min(total))
        .flat_map(|phase| (phase..total).step_by(stride))
        .collect()
}

/// Every `stride`-th frame index starting from zero. A `stride` of 0 selects nothing.
pub fn strided_targets(total: usize, stride: usize) -> Vec<usize> {
    if stride == 0 {
        return Vec::new();
    }
    (0..total).step_by(stride).collect()
}
