use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which analyses to run over the input frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Link points across frames into species
    Link,
    /// Search the frames after each target frame for matching points
    Search,
    #[default]
    /// Do both
    Both,
}

impl Mode {
    pub fn links(&self) -> bool {
        matches!(self, Self::Link | Self::Both)
    }

    pub fn searches(&self) -> bool {
        matches!(self, Self::Search | Self::Both)
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn non_negative_float(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|e| e.to_string())?;
    if value.is_nan() || value < 0.0 {
        Err(format!("`{s}` is less than zero"))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_non_negative_float() {
        assert_eq!(non_negative_float("0.003"), Ok(0.003));
        assert_eq!(non_negative_float("0"), Ok(0.0));
        assert!(non_negative_float("-1").is_err());
        assert!(non_negative_float("x").is_err());
    }

    #[test]
    fn test_mode() {
        assert!(Mode::Both.links() && Mode::Both.searches());
        assert!(!Mode::Link.searches());
        assert!(!Mode::Search.links());
    }
}
