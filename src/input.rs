use std::fs;
use std::path::Path;

use crate::codec;
use crate::error::{InputError, ParseError};
use crate::shape::ShapeRecord;
use crate::InputFormat;

pub type Item = Result<ShapeRecord, ParseError>;

/// Loads a batch of shapes from a file.
pub fn load_file(path: &Path, format: InputFormat) -> Result<Vec<Item>, InputError> {
    log::info!("Loading file: {}", path.display());
    let text = fs::read_to_string(path)?;
    let items = read_batch(&text, format)?;
    log::info!("Found {} shapes in {}", items.len(), path.display());
    Ok(items)
}

/// Splits `text` into shape items.
///
/// Individual WKT strings that fail to parse become `Err` items so the caller
/// can report them, and so does a `null` entry in a JSON array. A GeoJSON
/// document that fails to parse fails the whole batch.
pub fn read_batch(text: &str, format: InputFormat) -> Result<Vec<Item>, InputError> {
    match resolve(text, format) {
        Layout::Lines => Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(codec::decode)
            .collect()),
        Layout::JsonArray => {
            let raw: Vec<Option<String>> = serde_json::from_str(text)?;
            Ok(raw
                .iter()
                .map(|entry| match entry {
                    Some(s) => codec::decode(s),
                    None => Err(ParseError::Null),
                })
                .collect())
        }
        Layout::GeoJson => Ok(codec::decode_geojson(text)?
            .into_iter()
            .map(Ok)
            .collect()),
    }
}

enum Layout {
    Lines,
    JsonArray,
    GeoJson,
}

fn resolve(text: &str, format: InputFormat) -> Layout {
    match format {
        InputFormat::Lines => Layout::Lines,
        InputFormat::JsonArray => Layout::JsonArray,
        InputFormat::GeoJson => Layout::GeoJson,
        InputFormat::Auto => match text.trim_start().chars().next() {
            Some('[') => Layout::JsonArray,
            Some('{') => Layout::GeoJson,
            _ => Layout::Lines,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn lines_skip_blanks_and_comments() {
        let text = "# parcels\nPOLYGON ((0 0, 1 0, 1 1, 0 0))\n\n  POINT (1 1)  \nPOLYGON ((0 0\n";
        let items = read_batch(text, InputFormat::Auto).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].is_ok());
        assert!(matches!(items[2], Err(ParseError::UnbalancedParentheses { .. })));
    }

    #[test]
    fn json_array_keeps_empty_strings_as_failures() {
        let text = r#"["POLYGON ((0 0, 1 0, 1 1, 0 0))", ""]"#;
        let items = read_batch(text, InputFormat::Auto).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], Err(ParseError::Empty));
    }

    #[test]
    fn json_array_null_is_a_per_item_failure() {
        let text = r#"["POLYGON ((0 0, 1 0, 1 1, 0 0))", null, "POLYGON ((2 2, 3 2, 3 3, 2 2))"]"#;
        let items = read_batch(text, InputFormat::JsonArray).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert_eq!(items[1], Err(ParseError::Null));
        assert!(items[2].is_ok());
    }

    #[test]
    fn json_array_must_hold_strings() {
        assert!(matches!(
            read_batch("[1, 2]", InputFormat::JsonArray),
            Err(InputError::Json(_))
        ));
    }

    #[test]
    fn geojson_is_detected() {
        let text = r#"{"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}"#;
        let items = read_batch(text, InputFormat::Auto).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_ok());
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("polygon-combiner-{}.wkt", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "POLYGON ((0 0, 1 0, 1 1, 0 0))").unwrap();
        writeln!(file, "POLYGON ((2 2, 3 2, 3 3, 2 2))").unwrap();
        drop(file);

        let items = load_file(&path, InputFormat::Lines).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("/nonexistent/shapes.wkt"), InputFormat::Auto).unwrap_err();
        assert!(matches!(err, InputError::Io(_)));
    }
}
