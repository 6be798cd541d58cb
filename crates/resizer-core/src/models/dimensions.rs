use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimensionError {
    #[error("Please enter a {0}")]
    Missing(&'static str),

    #[error("{field} must be a whole number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: i64 },

    #[error("Maximum dimension size is {max}px ({field} was {value})")]
    TooLarge {
        field: &'static str,
        value: i64,
        max: u32,
    },
}

/// Target size of a resize, both sides in `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Validate raw user input against the maximum-dimension policy.
    pub fn from_input(
        width: Option<i64>,
        height: Option<i64>,
        max: u32,
    ) -> Result<Self, DimensionError> {
        let width = check_side("width", width, max)?;
        let height = check_side("height", height, max)?;
        Ok(Dimensions { width, height })
    }

    /// Validate query-string input. Blank values count as missing.
    pub fn from_query(
        width: Option<&str>,
        height: Option<&str>,
        max: u32,
    ) -> Result<Self, DimensionError> {
        let width = parse_side("width", width)?;
        let height = parse_side("height", height)?;
        Self::from_input(width, height, max)
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn parse_side(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, DimensionError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| DimensionError::NotANumber {
                field,
                value: value.to_string(),
            }),
    }
}

fn check_side(field: &'static str, value: Option<i64>, max: u32) -> Result<u32, DimensionError> {
    let value = value.ok_or(DimensionError::Missing(field))?;
    if value <= 0 {
        return Err(DimensionError::NotPositive { field, value });
    }
    match u32::try_from(value) {
        Ok(side) if side <= max => Ok(side),
        _ => Err(DimensionError::TooLarge { field, value, max }),
    }
}
