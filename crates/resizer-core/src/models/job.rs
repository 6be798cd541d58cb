use crate::constants::OUTPUT_KEY_PREFIX;
use crate::models::{Dimensions, ObjectKey};
use std::str::FromStr;

/// How a destination key is derived from a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKeyScheme {
    /// `resized-<source key>`. Resizing one file to two sizes overwrites the
    /// first output with the second.
    #[default]
    SourceKey,
    /// `resized-<w>x<h>-<source key>`. One output object per requested size.
    Dimensioned,
}

impl OutputKeyScheme {
    pub fn output_key(self, source: &ObjectKey, dimensions: Dimensions) -> String {
        match self {
            OutputKeyScheme::SourceKey => format!("{}{}", OUTPUT_KEY_PREFIX, source),
            OutputKeyScheme::Dimensioned => {
                format!("{}{}-{}", OUTPUT_KEY_PREFIX, dimensions, source)
            }
        }
    }
}

impl FromStr for OutputKeyScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" | "source_key" => Ok(OutputKeyScheme::SourceKey),
            "dimensioned" | "dimensions" => Ok(OutputKeyScheme::Dimensioned),
            _ => Err(anyhow::anyhow!("Invalid output key scheme: {}", s)),
        }
    }
}

/// One resize request, built and consumed within a single request/response
/// cycle. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeJob {
    pub source_key: ObjectKey,
    pub dimensions: Dimensions,
    pub output_key: String,
}

impl ResizeJob {
    pub fn new(source_key: ObjectKey, dimensions: Dimensions, scheme: OutputKeyScheme) -> Self {
        let output_key = scheme.output_key(&source_key, dimensions);
        Self {
            source_key,
            dimensions,
            output_key,
        }
    }
}
