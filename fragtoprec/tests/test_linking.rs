use fragtoprec::{
    link_between_frames, search_through_frames, FrameSet, IdCounter, LinkTermination,
    LinkingError, LinkingParams, Point,
};

/// A small linear congruential generator so the frame sets are the same on every run
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

const ANALYTES: [(f64, f64, i32); 4] = [
    (400.21, 2.0, 2),
    (512.77, 3.5, 3),
    (650.33, 5.0, 2),
    (812.40, 6.5, 1),
];

fn synthetic_frames(seed: u64, n_frames: usize) -> FrameSet {
    let mut rng = Lcg(seed);
    (0..n_frames)
        .map(|i| {
            let n_points = rng.next_below(7);
            let points = (0..n_points)
                .map(|_| {
                    let (mz, rt, charge) = ANALYTES[rng.next_below(ANALYTES.len())];
                    Point::new(
                        mz + rng.next_f64() * 0.002,
                        rt + rng.next_f64() * 0.002,
                        (rng.next_f64() * 1000.0) as f32 + 1.0,
                        charge,
                    )
                })
                .collect();
            (i as f64 * 0.25, points)
        })
        .collect()
}

fn sorted_points(points: impl Iterator<Item = Point>) -> Vec<Point> {
    let mut points: Vec<_> = points.collect();
    points.sort_by(|a, b| a.partial_cmp(b).unwrap());
    points
}

#[test_log::test]
fn test_species_partition_points() -> Result<(), LinkingError> {
    for seed in [1, 7, 42, 1009] {
        let mut frames = synthetic_frames(seed, 30);
        let expected = sorted_points(frames.iter().flat_map(|f| f.points().copied()));

        let mut ids = IdCounter::default();
        let report = link_between_frames(&mut frames, &LinkingParams::default(), &mut ids)?;

        let observed = sorted_points(report.iter().flat_map(|(_, s)| s.points().copied()));
        assert_eq!(expected, observed, "seed {seed}");
        assert_eq!(report.point_count(), expected.len());
        assert!(!frames.has_remaining());
        assert_eq!(ids.peek(), report.len());
        assert_eq!(
            report.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            (0..report.len()).collect::<Vec<_>>()
        );
    }
    Ok(())
}

#[test_log::test]
fn test_species_decrease_from_apex() -> Result<(), LinkingError> {
    let mut frames = synthetic_frames(12345, 40);
    let mut ids = IdCounter::default();
    let report = link_between_frames(&mut frames, &LinkingParams::default(), &mut ids)?;
    let mut multi_member = 0;
    for (id, species) in report.iter() {
        let members = species.members();
        let apex = species.apex();
        assert!(
            members.windows(2).all(|w| w[0].frame_index < w[1].frame_index),
            "species {id} revisits a frame: {species}"
        );
        assert!(
            members[apex..]
                .windows(2)
                .all(|w| w[1].point.intensity < w[0].point.intensity),
            "species {id} does not decay after its apex: {species}"
        );
        assert!(
            members[..=apex]
                .windows(2)
                .all(|w| w[0].point.intensity < w[1].point.intensity),
            "species {id} does not decay before its apex: {species}"
        );
        assert!(members.iter().all(|m| m.point.charge == members[0].point.charge));
        if members.len() > 1 {
            multi_member += 1;
        }
    }
    assert!(multi_member > 0);
    Ok(())
}

#[test_log::test]
fn test_unreachable_point_is_singleton() -> Result<(), LinkingError> {
    let mut frames: FrameSet = vec![
        (
            0.0,
            vec![
                Point::new(100.0, 1.0, 50.0, 1),
                Point::new(900.0, 9.0, 3.0, 4),
            ],
        ),
        (1.0, vec![Point::new(100.001, 1.001, 80.0, 1)]),
        (2.0, vec![Point::new(100.0, 1.0, 30.0, 1)]),
    ]
    .into_iter()
    .collect();

    let mut ids = IdCounter::default();
    let report = link_between_frames(&mut frames, &LinkingParams::default(), &mut ids)?;
    assert_eq!(report.len(), 2);
    assert_eq!(report.termination, LinkTermination::NoLocalMaxima);

    let trace = report.get(0).unwrap();
    assert_eq!(
        trace.points().map(|p| p.intensity).collect::<Vec<_>>(),
        vec![50.0, 80.0, 30.0]
    );

    let leftover = report.get(1).unwrap();
    assert!(leftover.is_singleton());
    assert_eq!(leftover.apex_member().point.charge, 4);
    assert_eq!(leftover.apex_member().frame_index, 0);
    assert_eq!(report.singleton_count(), 1);
    Ok(())
}

#[test_log::test]
fn test_precursor_search_is_pure() -> Result<(), LinkingError> {
    let frames = synthetic_frames(99, 34);
    let snapshot = frames.clone();
    let targets = fragtoprec::strided_targets(frames.len(), 17);
    assert_eq!(targets, vec![0, 17]);

    let params = LinkingParams::default();
    let mut ids = IdCounter::default();
    let first = search_through_frames(&frames, &targets, &params, &mut ids)?;
    let mut ids = IdCounter::default();
    let second = search_through_frames(&frames, &targets, &params, &mut ids)?;

    assert_eq!(first, second);
    assert_eq!(frames, snapshot);

    let seeds: usize = targets.iter().map(|t| frames[*t].len()).sum();
    assert_eq!(first.len(), seeds);
    for (_, group) in first.iter() {
        assert!(group.frame_indices().all(|i| i > group.target_frame()));
        assert!(group.points().all(|p| p.charge == group.seed.point.charge));
    }
    Ok(())
}

#[test_log::test]
fn test_search_after_linking_interleaved() -> Result<(), LinkingError> {
    let frames = synthetic_frames(2024, 12);
    let order = fragtoprec::interleaved_order(frames.len(), 4);
    let mut linked = frames.reordered(&order)?;
    assert_eq!(linked.coordinates()[1], frames[4].coordinate());

    let mut ids = IdCounter::default();
    let species = link_between_frames(&mut linked, &LinkingParams::default(), &mut ids)?;
    assert!(!species.is_empty());
    let groups = search_through_frames(&frames, &[0, 4, 8], &LinkingParams::default(), &mut ids)?;

    // Both results draw from the same counter, so their identifiers never collide
    let last_species = species.iter().map(|(k, _)| *k).max().unwrap_or_default();
    assert!(groups.iter().all(|(k, _)| *k > last_species));
    Ok(())
}
