use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub mod classifier;
pub mod codec;
pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod shape;
pub mod union;
pub mod validation;

pub use config::CombineOptions;
pub use error::{InputError, ParseError, PipelineError, TopologyError};
pub use pipeline::{combine, Combined, Combiner, Diagnostic, Issue};
pub use shape::{ShapeKind, ShapeRecord};

/// Output encoding of the combined shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaType {
    #[default]
    Wkt,
    GeoJson,
}

impl FromStr for AreaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wkt" => Ok(AreaType::Wkt),
            "geojson" => Ok(AreaType::GeoJson),
            other => Err(format!("unknown output format '{other}', expected wkt or geojson")),
        }
    }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaType::Wkt => f.write_str("wkt"),
            AreaType::GeoJson => f.write_str("geojson"),
        }
    }
}

/// Layout of a batch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Pick from the first non-blank character: `[` JSON array, `{` GeoJSON, else lines.
    #[default]
    Auto,
    /// One WKT string per line.
    Lines,
    /// A JSON array of WKT strings.
    JsonArray,
    /// A GeoJSON Geometry, Feature or FeatureCollection.
    GeoJson,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(InputFormat::Auto),
            "lines" => Ok(InputFormat::Lines),
            "json" => Ok(InputFormat::JsonArray),
            "geojson" => Ok(InputFormat::GeoJson),
            other => Err(format!("unknown input format '{other}'")),
        }
    }
}

/// Errors from [`process_files`].
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Loads every file into one batch and combines it.
pub fn process_files(
    files: &[PathBuf],
    input_format: InputFormat,
    format: AreaType,
    options: CombineOptions,
) -> Result<Combined, ProcessError> {
    let mut items = Vec::new();
    for file in files {
        items.extend(input::load_file(file, input_format)?);
    }
    Ok(Combiner::new(options).combine_decoded(items, format)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("WKT".parse::<AreaType>(), Ok(AreaType::Wkt));
        assert_eq!("GeoJson".parse::<AreaType>(), Ok(AreaType::GeoJson));
        assert!("kml".parse::<AreaType>().is_err());
        assert_eq!("json".parse::<InputFormat>(), Ok(InputFormat::JsonArray));
        assert_eq!(AreaType::default(), AreaType::Wkt);
    }
}
