//! Greedy cross-frame linking of points into [`Species`].
//!
//! Each pass finds the frames whose strongest remaining point is a local maximum
//! over its neighbors and grows a chain from every such seed, walking toward lower
//! and then higher frame indices. A walk accepts the *first* point in a frame's
//! working list that is within tolerance of the previously linked point, shares its
//! charge and is strictly less intense than it, so each chain describes a peak that
//! decays away from its apex. Linked points are consumed, and passes repeat until
//! no local maxima remain. Whatever is left over becomes a singleton species.
//!
//! The result depends on the order chains are grown in, since earlier chains take
//! points that later chains could otherwise have claimed.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::{debug, trace};

use crate::counter::IdCounter;
use crate::error::LinkingError;
use crate::frame::FrameSet;
use crate::maxima::{find_local_maxima, LocalMaximum};
use crate::point::Point;
use crate::species::{Species, LinkedPoint};

pub const DEFAULT_EPSILON: f64 = 0.003;
pub const DEFAULT_MAX_SKIPPED_FRAMES: usize = 2;

/// Matching tolerances for linking and precursor search
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkingParams {
    /// The absolute m/z window, applied on both sides
    pub mz_tolerance: f64,
    /// The absolute window on the within-frame time axis, applied on both sides
    pub time_tolerance: f64,
    /// The number of consecutive frames without a match a walk may step over
    pub max_skipped_frames: usize,
}

impl Default for LinkingParams {
    fn default() -> Self {
        Self {
            mz_tolerance: DEFAULT_EPSILON,
            time_tolerance: DEFAULT_EPSILON,
            max_skipped_frames: DEFAULT_MAX_SKIPPED_FRAMES,
        }
    }
}

impl LinkingParams {
    pub fn new(mz_tolerance: f64, time_tolerance: f64, max_skipped_frames: usize) -> Self {
        Self {
            mz_tolerance,
            time_tolerance,
            max_skipped_frames,
        }
    }

    /// Use the same tolerance `epsilon` for both m/z and time
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            mz_tolerance: epsilon,
            time_tolerance: epsilon,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_match(&self, reference: &Point, candidate: &Point) -> bool {
        candidate.charge == reference.charge
            && reference.is_near(candidate, self.mz_tolerance, self.time_tolerance)
    }

    #[inline]
    fn extends_chain(&self, previous: &Point, candidate: &Point) -> bool {
        candidate.intensity < previous.intensity && self.is_match(previous, candidate)
    }
}

/// Why the linking loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LinkTermination {
    /// Every point was consumed by a chain
    Exhausted,
    /// Points remained but none of them formed a local maximum, so they were
    /// emitted as singletons
    NoLocalMaxima,
}

/// The species produced by one linking run, keyed by identifier
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkingReport {
    pub species: BTreeMap<usize, Species>,
    pub termination: LinkTermination,
    /// The number of local maxima searches performed
    pub passes: usize,
}

impl LinkingReport {
    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Species> {
        self.species.get(&id)
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, usize, Species> {
        self.species.iter()
    }

    pub fn singleton_count(&self) -> usize {
        self.species.values().filter(|s| s.is_singleton()).count()
    }

    /// The number of points across all species
    pub fn point_count(&self) -> usize {
        self.species.values().map(|s| s.len()).sum()
    }

    pub fn into_inner(self) -> BTreeMap<usize, Species> {
        self.species
    }
}

/// Walk across the frames in `steps`, linking at most one point per frame, until the
/// walk runs into an exhausted frame or too many consecutive frames without a match.
fn walk<I: Iterator<Item = usize>>(
    frames: &mut FrameSet,
    steps: I,
    seed: Point,
    params: &LinkingParams,
) -> Vec<LinkedPoint> {
    let mut members = Vec::new();
    let mut previous = seed;
    let mut skipped = 0;
    for frame_index in steps {
        let frame = &mut frames[frame_index];
        if frame.is_empty() {
            break;
        }
        let hit = frame
            .find_first(|p| params.extends_chain(&previous, p))
            .and_then(|slot| frame.take(slot));
        match hit {
            Some(point) => {
                members.push(LinkedPoint::new(frame_index, frame.coordinate(), point));
                previous = point;
                skipped = 0;
            }
            None => {
                skipped += 1;
                if skipped > params.max_skipped_frames {
                    break;
                }
            }
        }
    }
    members
}

/// Grow one [`Species`] from the point in slot `point_index` of frame `frame_index`,
/// consuming every point it links.
///
/// Returns `Ok(None)` when the seed frame is exhausted or the seed point was already
/// consumed.
pub fn link_from_seed(
    frames: &mut FrameSet,
    frame_index: usize,
    point_index: usize,
    params: &LinkingParams,
) -> Result<Option<Species>, LinkingError> {
    frames.check_index(frame_index)?;
    let frame = &mut frames[frame_index];
    if frame.is_empty() {
        return Ok(None);
    }
    if point_index >= frame.slot_count() {
        return Err(LinkingError::SeedOutOfBounds {
            frame_index,
            point_index,
        });
    }
    let coordinate = frame.coordinate();
    let seed = match frame.take(point_index) {
        Some(seed) => seed,
        None => return Ok(None),
    };

    let frame_count = frames.len();
    let before = walk(frames, (0..frame_index).rev(), seed, params);
    let after = walk(frames, frame_index + 1..frame_count, seed, params);
    trace!(
        "Linked {} points before and {} after seed {:?} in frame {frame_index}",
        before.len(),
        after.len(),
        seed
    );

    Ok(Some(Species::from_walks(
        LinkedPoint::new(frame_index, coordinate, seed),
        before,
        after,
    )))
}

/// Partition every point in a [`FrameSet`] into [`Species`]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameLinker {
    pub params: LinkingParams,
}

impl FrameLinker {
    pub fn new(params: LinkingParams) -> Self {
        Self { params }
    }

    fn link_maxima(
        &self,
        frames: &mut FrameSet,
        maxima: &[LocalMaximum],
        ids: &mut IdCounter,
        species: &mut BTreeMap<usize, Species>,
    ) -> Result<(), LinkingError> {
        for maximum in maxima {
            if let Some(s) =
                link_from_seed(frames, maximum.frame_index, maximum.point_index, &self.params)?
            {
                species.insert(ids.next_id(), s);
            }
        }
        Ok(())
    }

    /// Consume all points in `frames`, drawing species identifiers from `ids`.
    ///
    /// When this returns, every frame in `frames` is exhausted.
    pub fn link(
        &self,
        frames: &mut FrameSet,
        ids: &mut IdCounter,
    ) -> Result<LinkingReport, LinkingError> {
        let mut species = BTreeMap::new();
        let mut passes = 0;
        let mut termination = LinkTermination::Exhausted;

        while frames.has_remaining() {
            let maxima: Vec<_> = find_local_maxima(frames).collect();
            passes += 1;
            debug!(
                "Pass {passes}: {} local maxima, {} points remaining",
                maxima.len(),
                frames.remaining()
            );
            if maxima.is_empty() {
                termination = LinkTermination::NoLocalMaxima;
                break;
            }
            self.link_maxima(frames, &maxima, ids, &mut species)?;
        }

        let mut leftover = 0;
        for frame_index in 0..frames.len() {
            let frame = &mut frames[frame_index];
            let coordinate = frame.coordinate();
            for slot in 0..frame.slot_count() {
                if let Some(point) = frame.take(slot) {
                    species.insert(
                        ids.next_id(),
                        Species::singleton(LinkedPoint::new(frame_index, coordinate, point)),
                    );
                    leftover += 1;
                }
            }
        }

        debug!(
            "Linking finished after {passes} passes with {} species ({leftover} unlinked points)",
            species.len()
        );

        Ok(LinkingReport {
            species,
            termination,
            passes,
        })
    }
}

/// Partition every point in `frames` into [`Species`] using `params`.
///
/// See [`FrameLinker::link`].
pub fn link_between_frames(
    frames: &mut FrameSet,
    params: &LinkingParams,
    ids: &mut IdCounter,
) -> Result<LinkingReport, LinkingError> {
    FrameLinker::new(*params).link(frames, ids)
}
