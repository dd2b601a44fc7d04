use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::point::Point;

/// A point together with the frame it was found in
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkedPoint {
    pub frame_index: usize,
    pub coordinate: f64,
    pub point: Point,
}

impl LinkedPoint {
    pub fn new(frame_index: usize, coordinate: f64, point: Point) -> Self {
        Self {
            frame_index,
            coordinate,
            point,
        }
    }
}

/// A chain of points across frames believed to be the signal trace of a single analyte.
///
/// Members are ordered by ascending frame index and no frame appears twice. The member
/// the chain was grown from is the apex.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Species {
    members: Vec<LinkedPoint>,
    apex: usize,
}

impl Species {
    /// A species made of a single point
    pub fn singleton(member: LinkedPoint) -> Self {
        Self {
            members: vec![member],
            apex: 0,
        }
    }

    /// Assemble a species from the seed and the members found walking away from it.
    /// `before` is in the order it was walked, nearest to the seed first.
    pub(crate) fn from_walks(
        seed: LinkedPoint,
        mut before: Vec<LinkedPoint>,
        after: Vec<LinkedPoint>,
    ) -> Self {
        before.reverse();
        let apex = before.len();
        let mut members = before;
        members.reserve(after.len() + 1);
        members.push(seed);
        members.extend(after);
        Self { members, apex }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    pub fn members(&self) -> &[LinkedPoint] {
        &self.members
    }

    /// The position of the seed member in [`Species::members`]
    pub fn apex(&self) -> usize {
        self.apex
    }

    pub fn apex_member(&self) -> &LinkedPoint {
        &self.members[self.apex]
    }

    pub fn coordinates(&self) -> impl Iterator<Item = f64> + '_ {
        self.members.iter().map(|m| m.coordinate)
    }

    pub fn frame_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|m| m.frame_index)
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.members.iter().map(|m| &m.point)
    }

    pub fn total_intensity(&self) -> f32 {
        self.members.iter().map(|m| m.point.intensity).sum()
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, m) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}@{}: ({}, {}, {}, {})",
                m.frame_index, m.coordinate, m.point.mz, m.point.rt, m.point.intensity, m.point.charge
            )?;
        }
        write!(f, "]")
    }
}
