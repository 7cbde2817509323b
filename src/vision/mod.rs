//! Geometry Extraction
//!
//! Runs the platform recognition engine on an image file and converts each
//! reported span into a pixel-space [`TextEntity`] under the requested origin
//! convention. Backends:
//! - Apple Vision (macOS)
//! - Windows OCR API (Media.Ocr)

pub mod engine;

#[cfg(target_os = "macos")]
pub mod apple;
#[cfg(target_os = "windows")]
pub mod windows_ocr;

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExtractError;
use crate::geometry::{quad_to_bounds, rect_to_bounds, round3, Origin, PixelBounds, Polygon};

pub use engine::{platform_engine, RecognitionEngine, RecognizedSpan, SpanGeometry};

/// Speed/accuracy tradeoff requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionMethod {
    /// Low-accuracy, high-speed recognition
    Fast,
    /// Default high-accuracy recognition
    #[default]
    Accurate,
}

/// Options for one extraction call
#[derive(Debug, Clone, Copy, Default)]
pub struct RecognitionOptions {
    /// Vertical-origin convention for reported coordinates
    pub origin: Origin,
    /// Speed/accuracy tradeoff
    pub method: RecognitionMethod,
}

/// One recognized text span in pixel coordinates
///
/// All numeric fields are rounded to 3 decimal digits. Rotation and polygon
/// are present only when the engine reported quadrilateral geometry.
#[derive(Debug, Clone, Serialize)]
pub struct TextEntity {
    pub text: String,
    /// Recognition confidence in [0,1]
    pub confidence: f64,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,
}

/// Result of one extraction call
///
/// Entity order follows the engine's reporting order, which is not guaranteed
/// to be reading order.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub image_width: f64,
    pub image_height: f64,
    pub entities: Vec<TextEntity>,
}

/// Extract text entities from the image file at `path`
///
/// Reads the image dimensions, invokes the engine synchronously, and converts
/// every reported span into the requested coordinate convention. An image
/// with no recognizable text yields an empty entity list, not an error.
pub fn extract(
    path: &Path,
    options: RecognitionOptions,
    engine: &dyn RecognitionEngine,
) -> Result<ExtractionResult, ExtractError> {
    let (width, height) = image::image_dimensions(path).map_err(|e| ExtractError::ImageDecode {
        path: path.to_path_buf(),
        source: e,
    })?;
    let (image_width, image_height) = (f64::from(width), f64::from(height));

    debug!("Recognizing text in {:?} ({}x{})", path, width, height);

    let spans = engine.recognize(path, options.method)?;

    debug!("Engine reported {} text spans", spans.len());

    let entities = spans
        .into_iter()
        .map(|span| span_to_entity(span, image_width, image_height, options.origin))
        .collect();

    Ok(ExtractionResult {
        image_width,
        image_height,
        entities,
    })
}

/// Convert an engine span into a pixel-space entity
fn span_to_entity(span: RecognizedSpan, width: f64, height: f64, origin: Origin) -> TextEntity {
    let PixelBounds {
        xmin,
        ymin,
        xmax,
        ymax,
        rotation_degrees,
        polygon,
    } = match &span.geometry {
        SpanGeometry::Box(rect) => rect_to_bounds(rect, width, height, origin),
        SpanGeometry::Quad(quad) => quad_to_bounds(quad, width, height, origin),
    };

    TextEntity {
        text: span.text,
        confidence: round3(span.confidence.clamp(0.0, 1.0)),
        xmin,
        ymin,
        xmax,
        ymax,
        rotation_degrees,
        polygon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{NormPoint, NormQuad, NormRect};
    use crate::input::{normalize, ImageSource};
    use image::{DynamicImage, RgbaImage};

    /// Engine double returning canned spans, for platform-neutral tests
    struct MockEngine {
        spans: Vec<RecognizedSpan>,
        fail: bool,
    }

    impl MockEngine {
        fn with_spans(spans: Vec<RecognizedSpan>) -> Self {
            Self { spans, fail: false }
        }

        fn failing() -> Self {
            Self {
                spans: vec![],
                fail: true,
            }
        }
    }

    impl RecognitionEngine for MockEngine {
        fn recognize(
            &self,
            _image: &Path,
            _method: RecognitionMethod,
        ) -> Result<Vec<RecognizedSpan>, ExtractError> {
            if self.fail {
                return Err(ExtractError::RecognitionEngine("simulated failure".to_string()));
            }
            Ok(self.spans.clone())
        }
    }

    fn write_test_png(width: u32, height: u32) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        let img = RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        DynamicImage::ImageRgba8(img).save(file.path()).unwrap();
        file
    }

    fn hello_span() -> RecognizedSpan {
        // "HELLO" at x in [100,300], y in [200,220] of a 1000x500 image
        RecognizedSpan {
            text: "HELLO".to_string(),
            confidence: 0.97,
            geometry: SpanGeometry::Box(NormRect {
                x: 0.1,
                y: 0.4,
                width: 0.2,
                height: 0.04,
            }),
        }
    }

    #[test]
    fn test_dimensions_match_image() {
        let file = write_test_png(64, 48);
        let engine = MockEngine::with_spans(vec![]);
        let result = extract(file.path(), RecognitionOptions::default(), &engine).unwrap();
        assert_eq!(result.image_width, 64.0);
        assert_eq!(result.image_height, 48.0);
    }

    #[test]
    fn test_zero_spans_is_empty_result_not_error() {
        let file = write_test_png(16, 16);
        let engine = MockEngine::with_spans(vec![]);
        let result = extract(file.path(), RecognitionOptions::default(), &engine).unwrap();
        assert!(result.entities.is_empty());
        assert_eq!(result.image_width, 16.0);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let engine = MockEngine::with_spans(vec![]);
        let err = extract(
            Path::new("/nonexistent/image.png"),
            RecognitionOptions::default(),
            &engine,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::ImageDecode { .. }));
    }

    #[test]
    fn test_engine_failure_propagates() {
        let file = write_test_png(16, 16);
        let engine = MockEngine::failing();
        let err = extract(file.path(), RecognitionOptions::default(), &engine).unwrap_err();
        assert!(matches!(err, ExtractError::RecognitionEngine(_)));
    }

    #[test]
    fn test_hello_bottom_origin() {
        let file = write_test_png(1000, 500);
        let engine = MockEngine::with_spans(vec![hello_span()]);
        let result = extract(file.path(), RecognitionOptions::default(), &engine).unwrap();

        let entity = &result.entities[0];
        assert_eq!(entity.text, "HELLO");
        assert_eq!(entity.confidence, 0.97);
        assert_eq!((entity.xmin, entity.xmax), (100.0, 300.0));
        assert_eq!((entity.ymin, entity.ymax), (200.0, 220.0));
        assert!(entity.rotation_degrees.is_none());
        assert!(entity.polygon.is_none());
    }

    #[test]
    fn test_hello_top_origin_flips_y_range() {
        let file = write_test_png(1000, 500);
        let engine = MockEngine::with_spans(vec![hello_span()]);
        let options = RecognitionOptions {
            origin: Origin::Top,
            ..Default::default()
        };
        let result = extract(file.path(), options, &engine).unwrap();

        let entity = &result.entities[0];
        assert_eq!((entity.xmin, entity.xmax), (100.0, 300.0));
        assert_eq!((entity.ymin, entity.ymax), (280.0, 300.0));
    }

    #[test]
    fn test_quad_span_reports_rotation_and_polygon() {
        let file = write_test_png(1000, 500);
        let span = RecognizedSpan {
            text: "tilted".to_string(),
            confidence: 0.8,
            geometry: SpanGeometry::Quad(NormQuad {
                top_left: NormPoint { x: 0.1, y: 0.44 },
                top_right: NormPoint { x: 0.3, y: 0.44 },
                bottom_left: NormPoint { x: 0.1, y: 0.4 },
                bottom_right: NormPoint { x: 0.3, y: 0.4 },
            }),
        };
        let engine = MockEngine::with_spans(vec![span]);
        let result = extract(file.path(), RecognitionOptions::default(), &engine).unwrap();

        let entity = &result.entities[0];
        assert_eq!(entity.rotation_degrees, Some(0.0));
        let polygon = entity.polygon.unwrap();
        assert_eq!(polygon.top_left.x, 100.0);
        assert_eq!(polygon.top_left.y, 220.0);
    }

    #[test]
    fn test_entity_invariants() {
        let file = write_test_png(1000, 500);
        let engine = MockEngine::with_spans(vec![hello_span(), hello_span()]);
        for origin in [Origin::Bottom, Origin::Top] {
            let options = RecognitionOptions {
                origin,
                ..Default::default()
            };
            let result = extract(file.path(), options, &engine).unwrap();
            for entity in &result.entities {
                assert!((0.0..=1.0).contains(&entity.confidence));
                assert!(entity.xmin <= entity.xmax);
                assert!(entity.ymin <= entity.ymax);
            }
        }
    }

    #[test]
    fn test_confidence_clamped_and_rounded() {
        let file = write_test_png(10, 10);
        let mut span = hello_span();
        span.confidence = 1.00049;
        let engine = MockEngine::with_spans(vec![span]);
        let result = extract(file.path(), RecognitionOptions::default(), &engine).unwrap();
        assert_eq!(result.entities[0].confidence, 1.0);
    }

    #[test]
    fn test_entity_order_follows_engine_order() {
        let file = write_test_png(100, 100);
        let mut first = hello_span();
        first.text = "first".to_string();
        let mut second = hello_span();
        second.text = "second".to_string();
        let engine = MockEngine::with_spans(vec![first, second]);
        let result = extract(file.path(), RecognitionOptions::default(), &engine).unwrap();
        let texts: Vec<_> = result.entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn test_result_serializes_to_flat_json() {
        let file = write_test_png(1000, 500);
        let engine = MockEngine::with_spans(vec![hello_span()]);
        let result = extract(file.path(), RecognitionOptions::default(), &engine).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["image_width"], 1000.0);
        assert_eq!(json["image_height"], 500.0);
        assert_eq!(json["entities"][0]["text"], "HELLO");
        assert_eq!(json["entities"][0]["xmin"], 100.0);
        // Box geometry: no rotation/polygon keys at all
        assert!(json["entities"][0].get("rotation_degrees").is_none());
        assert!(json["entities"][0].get("polygon").is_none());
    }

    #[test]
    fn test_source_parity_path_bytes_pixels() {
        // The same image supplied three ways yields identical entities
        let file = write_test_png(64, 64);
        let bytes = std::fs::read(file.path()).unwrap();
        let decoded = image::open(file.path()).unwrap().to_rgba8();
        let (width, height) = decoded.dimensions();

        let sources = [
            ImageSource::Path(file.path().to_path_buf()),
            ImageSource::Bytes(bytes),
            ImageSource::Pixels {
                data: decoded.into_raw(),
                width,
                height,
            },
        ];

        let engine = MockEngine::with_spans(vec![hello_span()]);
        let mut outputs = Vec::new();
        for source in sources {
            let normalized = normalize(source).unwrap();
            let result =
                extract(normalized.path(), RecognitionOptions::default(), &engine).unwrap();
            outputs.push(serde_json::to_string(&result).unwrap());
        }

        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[1], outputs[2]);
    }
}
