use std::{error::Error, fmt::Display, num::ParseIntError, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};

/// An inclusive range of frame numbers. A missing `end` runs through the last frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl FrameRange {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// The frame indices this range selects from a run of `total` frames
    pub fn indices(&self, total: usize) -> Vec<usize> {
        let end = self.end.map(|e| e.saturating_add(1).min(total)).unwrap_or(total);
        (self.start.min(end)..end).collect()
    }
}

impl Display for FrameRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}-", self.start),
        }
    }
}

#[derive(Debug)]
pub enum FrameRangeParseError {
    MalformedStart(ParseIntError),
    MalformedEnd(ParseIntError),
    Inverted(usize, usize),
}

impl Display for FrameRangeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameRangeParseError::MalformedStart(e) => {
                write!(f, "Failed to parse frame range start {e}")
            }
            FrameRangeParseError::MalformedEnd(e) => {
                write!(f, "Failed to parse frame range end {e}")
            }
            FrameRangeParseError::Inverted(start, end) => {
                write!(f, "Frame range start {start} is after its end {end}")
            }
        }
    }
}

impl Error for FrameRangeParseError {}

impl FromStr for FrameRange {
    type Err = FrameRangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (start_s, end_s) = if let Some(parts) = s.split_once(':') {
            parts
        } else if let Some(parts) = s.split_once('-') {
            parts
        } else {
            (s, s)
        };
        let start = if start_s.is_empty() {
            0
        } else {
            start_s
                .trim()
                .parse()
                .map_err(FrameRangeParseError::MalformedStart)?
        };
        let end = if end_s.is_empty() {
            None
        } else {
            Some(
                end_s
                    .trim()
                    .parse()
                    .map_err(FrameRangeParseError::MalformedEnd)?,
            )
        };
        if let Some(end) = end {
            if end < start {
                return Err(FrameRangeParseError::Inverted(start, end));
            }
        }
        Ok(FrameRange { start, end })
    }
}

impl From<RangeInclusive<usize>> for FrameRange {
    fn from(value: RangeInclusive<usize>) -> Self {
        Self::new(*value.start(), Some(*value.end()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_fromstr() -> Result<(), FrameRangeParseError> {
        let t: FrameRange = "52-".parse()?;
        assert_eq!(t.start, 52);
        assert_eq!(t.end, None);

        let t: FrameRange = "-52".parse()?;
        assert_eq!(t.start, 0);
        assert_eq!(t.end, Some(52));

        let t: FrameRange = "32-52".parse()?;
        assert_eq!(t, FrameRange::from(32..=52));
        assert_eq!(t.to_string(), "32-52");

        let t: FrameRange = "-".parse()?;
        assert_eq!(t, FrameRange::default());

        let t: FrameRange = "7".parse()?;
        assert_eq!(t, FrameRange::new(7, Some(7)));

        let t: FrameRange = "3:5".parse()?;
        assert_eq!(t, FrameRange::new(3, Some(5)));

        Ok(())
    }

    #[test]
    fn test_frame_fromstr_malformed() {
        assert!(matches!(
            "a-".parse::<FrameRange>(),
            Err(FrameRangeParseError::MalformedStart(_))
        ));
        assert!(matches!(
            "-b".parse::<FrameRange>(),
            Err(FrameRangeParseError::MalformedEnd(_))
        ));
        // Both ends are bad, the start is reported first
        assert!(matches!(
            "a-b".parse::<FrameRange>(),
            Err(FrameRangeParseError::MalformedStart(_))
        ));
        assert!(matches!(
            "9-2".parse::<FrameRange>(),
            Err(FrameRangeParseError::Inverted(9, 2))
        ));
    }

    #[test]
    fn test_indices() {
        let t = FrameRange::new(2, Some(4));
        assert_eq!(t.indices(10), vec![2, 3, 4]);
        assert_eq!(t.indices(3), vec![2]);
        assert!(t.indices(1).is_empty());
        assert_eq!(FrameRange::new(4, Some(4)).indices(10), vec![4]);
        assert_eq!(FrameRange::default().indices(3), vec![0, 1, 2]);
    }
}
