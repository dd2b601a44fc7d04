//! Exhaustive search for points in later frames that match the points of
//! designated target frames.
//!
//! Unlike [`linker`](crate::linker), nothing is consumed: a point may be claimed
//! by many groups or by none, and searching the same frames twice gives the same
//! groups.

use std::collections::BTreeMap;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::counter::IdCounter;
use crate::error::LinkingError;
use crate::frame::FrameSet;
use crate::linker::LinkingParams;
use crate::point::Point;
use crate::species::LinkedPoint;

/// A point from a target frame and every later point that matched it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrecursorMatchGroup {
    pub seed: LinkedPoint,
    pub matches: Vec<LinkedPoint>,
}

impl PrecursorMatchGroup {
    pub fn new(seed: LinkedPoint) -> Self {
        Self {
            seed,
            matches: Vec::new(),
        }
    }

    pub fn target_frame(&self) -> usize {
        self.seed.frame_index
    }

    /// The number of matched points, excluding the seed
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Whether an identical point is already recorded in this group, the seed included
    pub fn contains(&self, point: &Point) -> bool {
        self.seed.point == *point || self.matches.iter().any(|m| m.point == *point)
    }

    pub fn frame_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.matches.iter().map(|m| m.frame_index)
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.matches.iter().map(|m| &m.point)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrecursorSearchReport {
    pub groups: BTreeMap<usize, PrecursorMatchGroup>,
}

impl PrecursorSearchReport {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&PrecursorMatchGroup> {
        self.groups.get(&id)
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, usize, PrecursorMatchGroup> {
        self.groups.iter()
    }

    /// The number of matched points across all groups, counting shared points once per group
    pub fn match_count(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    pub fn into_inner(self) -> BTreeMap<usize, PrecursorMatchGroup> {
        self.groups
    }
}

/// Searches the frames following each target frame for points matching the target
/// frame's points on m/z, time and charge.
///
/// Only the tolerances of [`LinkingParams`] are used.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PrecursorSearch {
    pub params: LinkingParams,
}

impl PrecursorSearch {
    pub fn new(params: LinkingParams) -> Self {
        Self { params }
    }

    /// Build one group per remaining point of frame `target`, scanning every frame after
    /// `target` through the end of `frames`.
    pub fn search_target(
        &self,
        frames: &FrameSet,
        target: usize,
    ) -> Result<Vec<PrecursorMatchGroup>, LinkingError> {
        frames.check_index(target)?;
        let frame = &frames[target];
        let groups: Vec<_> = frame
            .points()
            .map(|seed| {
                let mut group =
                    PrecursorMatchGroup::new(LinkedPoint::new(target, frame.coordinate(), *seed));
                for (frame_index, later) in frames.iter().enumerate().skip(target + 1) {
                    for point in later.points() {
                        if self.params.is_match(seed, point) && !group.contains(point) {
                            group
                                .matches
                                .push(LinkedPoint::new(frame_index, later.coordinate(), *point));
                        }
                    }
                }
                group
            })
            .collect();
        debug!(
            "Target frame {target}: {} seeds, {} matches",
            groups.len(),
            groups.iter().map(|g| g.len()).sum::<usize>()
        );
        Ok(groups)
    }

    #[cfg(feature = "parallelism")]
    fn search_all(
        &self,
        frames: &FrameSet,
        targets: &[usize],
    ) -> Result<Vec<Vec<PrecursorMatchGroup>>, LinkingError> {
        targets
            .par_iter()
            .map(|target| self.search_target(frames, *target))
            .collect()
    }

    #[cfg(not(feature = "parallelism"))]
    fn search_all(
        &self,
        frames: &FrameSet,
        targets: &[usize],
    ) -> Result<Vec<Vec<PrecursorMatchGroup>>, LinkingError> {
        targets
            .iter()
            .map(|target| self.search_target(frames, *target))
            .collect()
    }

    /// Search every frame in `targets`, in the order given, drawing group identifiers
    /// from `ids`. `frames` is only read.
    pub fn search(
        &self,
        frames: &FrameSet,
        targets: &[usize],
        ids: &mut IdCounter,
    ) -> Result<PrecursorSearchReport, LinkingError> {
        for target in targets {
            frames.check_index(*target)?;
        }

        let groups = self
            .search_all(frames, targets)?
            .into_iter()
            .flatten()
            .map(|group| (ids.next_id(), group))
            .collect();

        Ok(PrecursorSearchReport { groups })
    }
}

/// Search the frames after each of `targets` for points matching the target frames'
/// points using `params`.
///
/// See [`PrecursorSearch::search`].
pub fn search_through_frames(
    frames: &FrameSet,
    targets: &[usize],
    params: &LinkingParams,
    ids: &mut IdCounter,
) -> Result<PrecursorSearchReport, LinkingError> {
    PrecursorSearch::new(*params).search(frames, targets, ids)
}

#[cfg(test)]
mod test {
    use super::*;

    fn frames_of(points: Vec<Vec<(f64, f64, f32, i32)>>) -> FrameSet {
        points
            .into_iter()
            .enumerate()
            .map(|(i, pts)| (i as f64, pts.into_iter().map(Point::from).collect()))
            .collect()
    }

    #[test]
    fn test_charge_mismatch_excluded() -> Result<(), LinkingError> {
        let frames = frames_of(vec![
            vec![(200.0, 5.0, 100.0, 2)],
            vec![],
            vec![(350.0, 2.0, 10.0, 2)],
            vec![(200.002, 5.001, 40.0, 2)],
            vec![],
            vec![(200.0, 5.0, 10.0, 3)],
        ]);
        let mut ids = IdCounter::default();
        let report = search_through_frames(&frames, &[0], &LinkingParams::default(), &mut ids)?;
        assert_eq!(report.len(), 1);
        let group = report.get(0).unwrap();
        assert_eq!(group.target_frame(), 0);
        assert_eq!(group.frame_indices().collect::<Vec<_>>(), vec![3]);
        assert_eq!(group.matches[0].point.intensity, 40.0);
        Ok(())
    }

    #[test]
    fn test_shared_scan_range_and_duplicates() -> Result<(), LinkingError> {
        let frames = frames_of(vec![
            vec![(100.0, 1.0, 1.0, 1)],
            vec![(100.0, 1.0, 5.0, 1), (100.001, 1.0, 7.0, 1)],
            vec![(100.001, 1.0, 7.0, 1), (100.0, 1.0, 5.0, 1), (100.0, 1.0, 9.0, 1)],
            vec![(100.0, 1.0, 5.0, 1)],
        ]);
        let mut ids = IdCounter::default();
        let report = search_through_frames(&frames, &[1, 2], &LinkingParams::default(), &mut ids)?;
        assert_eq!(report.len(), 5);

        // Both seeds in frame 1 scan frames 2 and 3 only.
        let g0 = report.get(0).unwrap();
        assert_eq!(g0.target_frame(), 1);
        let found: Vec<_> = g0.points().map(|p| p.intensity).collect();
        assert_eq!(found, vec![7.0, 9.0]);

        let g1 = report.get(1).unwrap();
        let found: Vec<_> = g1.points().map(|p| p.intensity).collect();
        assert_eq!(found, vec![5.0, 9.0]);

        // Frame 3 is the only frame after frame 2, and its point is identical to the
        // seed of group 3.
        let g3 = report.get(3).unwrap();
        assert_eq!(g3.seed.point.intensity, 5.0);
        assert!(g3.is_empty());
        assert_eq!(report.get(2).unwrap().len(), 1);
        assert_eq!(report.match_count(), 2 + 2 + 1 + 0 + 1);
        Ok(())
    }

    #[test]
    fn test_out_of_bounds_target() {
        let frames = frames_of(vec![vec![(100.0, 1.0, 1.0, 1)]]);
        let mut ids = IdCounter::default();
        let result = search_through_frames(&frames, &[0, 3], &LinkingParams::default(), &mut ids);
        assert!(matches!(
            result,
            Err(LinkingError::FrameOutOfBounds {
                index: 3,
                frame_count: 1
            })
        ));
        assert_eq!(ids.peek(), 0);
    }

    #[test]
    fn test_search_single_target() -> Result<(), LinkingError> {
        let frames = frames_of(vec![
            vec![(100.0, 1.0, 1.0, 1)],
            vec![(100.001, 1.0, 4.0, 1)],
        ]);
        let search = PrecursorSearch::new(LinkingParams::default());
        let groups = search.search_target(&frames, 0)?;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].frame_indices().collect::<Vec<_>>(), vec![1]);
        assert!(search.search_target(&frames, 1)?[0].is_empty());
        assert_eq!(
            search.search_target(&frames, 2),
            Err(LinkingError::FrameOutOfBounds {
                index: 2,
                frame_count: 2
            })
        );
        Ok(())
    }
}
