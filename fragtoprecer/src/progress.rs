use std::ops::{Add, AddAssign};

use fragtoprec::{LinkingReport, PrecursorSearchReport};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ProgressRecord {
    pub frames: usize,
    pub points: usize,
    pub species: usize,
    pub singletons: usize,
    pub linking_passes: usize,
    pub precursor_groups: usize,
    pub precursor_matches: usize,
}

impl ProgressRecord {
    pub fn from_linking(report: &LinkingReport) -> Self {
        Self {
            species: report.len(),
            singletons: report.singleton_count(),
            linking_passes: report.passes,
            ..Default::default()
        }
    }

    pub fn from_search(report: &PrecursorSearchReport) -> Self {
        Self {
            precursor_groups: report.len(),
            precursor_matches: report.match_count(),
            ..Default::default()
        }
    }
}

impl Add for ProgressRecord {
    type Output = ProgressRecord;

    fn add(self, rhs: Self) -> Self::Output {
        let mut dup = self;
        dup += rhs;
        dup
    }
}

impl AddAssign for ProgressRecord {
    fn add_assign(&mut self, rhs: Self) {
        self.frames += rhs.frames;
        self.points += rhs.points;
        self.species += rhs.species;
        self.singletons += rhs.singletons;
        self.linking_passes += rhs.linking_passes;
        self.precursor_groups += rhs.precursor_groups;
        self.precursor_matches += rhs.precursor_matches;
    }
}
