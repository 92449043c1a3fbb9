use std::fmt;

use crate::classifier::filter_polygonal;
use crate::codec;
use crate::config::CombineOptions;
use crate::error::{InvalidKindError, ParseError, PipelineError};
use crate::shape::{ShapeKind, ShapeRecord};
use crate::union::UnionResult;
use crate::validation;
use crate::AreaType;

/// Why an input was left out of the union.
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    Parse(ParseError),
    InvalidKind(InvalidKindError),
}

/// A skipped input and the reason it was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub index: usize,
    pub issue: Issue,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            Issue::Parse(e) => write!(f, "shape {}: {}", self.index, e),
            Issue::InvalidKind(e) => write!(f, "shape {}: {}", self.index, e),
        }
    }
}

/// The serialized union and everything that was skipped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Combined {
    /// Empty when no polygonal input survived.
    pub output: String,
    pub kind: Option<ShapeKind>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Combiner {
    options: CombineOptions,
}

impl Combiner {
    pub fn new(options: CombineOptions) -> Self {
        Self { options }
    }

    /// Combines a batch of WKT strings.
    pub fn combine<S: AsRef<str>>(
        &self,
        raw_shapes: &[S],
        format: AreaType,
    ) -> Result<Combined, PipelineError> {
        self.combine_decoded(
            raw_shapes.iter().map(|text| codec::decode(text.as_ref())),
            format,
        )
    }

    /// Combines shapes that were already decoded, e.g. from a GeoJSON file.
    /// Failed items are reported at their position in the batch.
    pub fn combine_decoded<I>(&self, items: I, format: AreaType) -> Result<Combined, PipelineError>
    where
        I: IntoIterator<Item = Result<ShapeRecord, ParseError>>,
    {
        let mut decoded = Vec::new();
        let mut diagnostics = Vec::new();

        for (index, item) in items.into_iter().enumerate() {
            match item {
                Ok(shape) => decoded.push((index, shape)),
                Err(source) if self.options.strict => {
                    return Err(PipelineError::Parse { index, source });
                }
                Err(e) => {
                    log::warn!("Shape {} could not be parsed: {}", index, e);
                    diagnostics.push(Diagnostic {
                        index,
                        issue: Issue::Parse(e),
                    });
                }
            }
        }

        self.finish(decoded, diagnostics, format)
    }

    fn finish(
        &self,
        decoded: Vec<(usize, ShapeRecord)>,
        mut diagnostics: Vec<Diagnostic>,
        format: AreaType,
    ) -> Result<Combined, PipelineError> {
        let total = decoded.len() + diagnostics.len();
        let filtered = filter_polygonal(decoded);
        diagnostics.extend(filtered.rejected.into_iter().map(|(index, e)| Diagnostic {
            index,
            issue: Issue::InvalidKind(e),
        }));
        diagnostics.sort_by_key(|d| d.index);

        log::info!(
            "Combining {} of {} shapes ({} skipped)",
            filtered.accepted.len(),
            total,
            diagnostics.len()
        );

        if filtered.accepted.is_empty() {
            return Ok(Combined {
                output: String::new(),
                kind: None,
                diagnostics,
            });
        }

        if self.options.validate {
            validation::validate_all(&filtered.accepted)?;
        }

        let result = self.options.union_engine().union(filtered.accepted)?;
        let kind = result.kind();
        let output = match &result {
            UnionResult::Empty => String::new(),
            UnionResult::Shape(shape) => codec::encode(shape, format)?,
        };

        Ok(Combined {
            output,
            kind,
            diagnostics,
        })
    }
}

/// Unions a batch of WKT strings with default options and returns the
/// serialized result. Skipped inputs are only logged.
pub fn combine<S: AsRef<str>>(raw_shapes: &[S], format: AreaType) -> Result<String, PipelineError> {
    Combiner::default()
        .combine(raw_shapes, format)
        .map(|combined| combined.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TopologyError;
    use std::time::Duration;

    const SQUARE: &str = "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))";

    #[test]
    fn point_is_reported_and_left_out() {
        let combined = Combiner::default()
            .combine(&["POINT (0 0)", SQUARE], AreaType::Wkt)
            .unwrap();

        assert_eq!(combined.kind, Some(ShapeKind::Polygon));
        assert_eq!(combined.output, codec::encode_wkt(&codec::decode(SQUARE).unwrap()));
        assert_eq!(
            combined.diagnostics,
            vec![Diagnostic {
                index: 0,
                issue: Issue::InvalidKind(InvalidKindError {
                    kind: ShapeKind::Point
                }),
            }]
        );
    }

    #[test]
    fn parse_failure_does_not_stop_the_batch() {
        let combined = Combiner::default()
            .combine(
                &[
                    "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0)",
                    "",
                    "POLYGON ((2 0, 3 0, 3 1, 2 1, 2 0))",
                    SQUARE,
                ],
                AreaType::Wkt,
            )
            .unwrap();

        assert_eq!(combined.kind, Some(ShapeKind::MultiPolygon));
        let indices: Vec<_> = combined.diagnostics.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert!(matches!(
            combined.diagnostics[0].issue,
            Issue::Parse(ParseError::UnbalancedParentheses { .. })
        ));
        assert_eq!(combined.diagnostics[1].issue, Issue::Parse(ParseError::Empty));
    }

    #[test]
    fn strict_mode_aborts_on_first_parse_failure() {
        let combiner = Combiner::new(CombineOptions {
            strict: true,
            ..CombineOptions::default()
        });
        let err = combiner
            .combine(&[SQUARE, "POLYGON ((0 0", SQUARE], AreaType::Wkt)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Parse { index: 1, .. }));
    }

    #[test]
    fn nothing_polygonal_is_an_empty_success() {
        let empty: [&str; 0] = [];
        assert_eq!(combine(&empty, AreaType::Wkt).unwrap(), "");
        assert_eq!(
            combine(&["POINT (1 1)", "LINESTRING (0 0, 1 1)"], AreaType::GeoJson).unwrap(),
            ""
        );
    }

    #[test]
    fn invalid_ring_aborts_with_its_index() {
        let err = combine(
            &["POINT (5 5)", SQUARE, "POLYGON ((0 0, 1 1, 1 0, 0 1, 0 0))"],
            AreaType::Wkt,
        )
        .unwrap_err();

        match err {
            PipelineError::Topology(TopologyError::InvalidRing { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected a topology error, got {other:?}"),
        }
        assert!(combine(&["POLYGON ((0 0, 1 1, 1 0, 0 1, 0 0))"], AreaType::Wkt)
            .unwrap_err()
            .to_string()
            .starts_with("union failed: invalid input geometry at index 0"));
    }

    #[test]
    fn deadline_is_reported() {
        let combiner = Combiner::new(CombineOptions::default().with_deadline(Duration::ZERO));
        let err = combiner
            .combine(&[SQUARE, "POLYGON ((2 0, 3 0, 3 1, 2 1, 2 0))"], AreaType::Wkt)
            .unwrap_err();
        assert!(matches!(err, PipelineError::DeadlineExceeded { .. }));
    }

    #[test]
    fn geojson_output_is_selected_by_format() {
        let output = combine(
            &[SQUARE, "POLYGON ((0.5 0, 1.5 0, 1.5 1, 0.5 1, 0.5 0))"],
            AreaType::GeoJson,
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["type"], "Polygon");
        assert!(json["coordinates"][0].as_array().unwrap().len() >= 5);
    }

    #[test]
    fn decoded_shapes_share_the_same_path() {
        let items = vec![
            codec::decode("POINT (1 1)"),
            Err(ParseError::GeoJson("bad feature".to_string())),
            codec::decode(SQUARE),
        ];
        let combined = Combiner::default()
            .combine_decoded(items, AreaType::Wkt)
            .unwrap();
        assert_eq!(combined.kind, Some(ShapeKind::Polygon));
        let messages: Vec<_> = combined.diagnostics.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "shape 0: polygon of invalid type Point not combined",
                "shape 1: malformed GeoJSON: bad feature",
            ]
        );
    }
}
