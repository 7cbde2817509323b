//! textlift - extract text and per-word geometry from images
//!
//! Wraps the platform's built-in OCR engine (Apple Vision on macOS, the
//! Windows OCR API on Windows) behind one synchronous call. The engine does
//! the recognition; this crate marshals the input image, converts the
//! engine's normalized geometry into pixel coordinates under a selectable
//! vertical-origin convention, and assembles a flat, JSON-serializable
//! result.
//!
//! ```no_run
//! use textlift::{extract_text, ImageSource, RecognitionOptions};
//!
//! let result = extract_text(
//!     ImageSource::Path("screenshot.png".into()),
//!     RecognitionOptions::default(),
//! )?;
//! for entity in &result.entities {
//!     println!("{} ({:.2}) at x=[{}, {}]", entity.text, entity.confidence, entity.xmin, entity.xmax);
//! }
//! # Ok::<(), textlift::ExtractError>(())
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod vision;

pub use error::ExtractError;
pub use geometry::{Origin, PixelPoint, Polygon};
pub use input::{normalize, ImageSource, NormalizedImage};
pub use vision::{
    extract, platform_engine, ExtractionResult, RecognitionEngine, RecognitionMethod,
    RecognitionOptions, TextEntity,
};

/// Extract text entities from `source` using the platform recognition engine
///
/// Normalizes the source to an image file, runs the engine synchronously, and
/// returns entities in the requested coordinate convention. Any temporary
/// file created during normalization is removed before this returns, on
/// success and on failure alike.
pub fn extract_text(
    source: ImageSource,
    options: RecognitionOptions,
) -> Result<ExtractionResult, ExtractError> {
    extract_text_with_language(source, options, "en-US")
}

/// [`extract_text`] with an explicit OCR language tag
///
/// The language is consulted by backends that need one (Windows); Apple
/// Vision picks languages automatically.
pub fn extract_text_with_language(
    source: ImageSource,
    options: RecognitionOptions,
    language: &str,
) -> Result<ExtractionResult, ExtractError> {
    let engine = vision::platform_engine(language)?;
    extract_text_with_engine(source, options, engine.as_ref())
}

/// [`extract_text`] against a caller-supplied engine
pub fn extract_text_with_engine(
    source: ImageSource,
    options: RecognitionOptions,
    engine: &dyn RecognitionEngine,
) -> Result<ExtractionResult, ExtractError> {
    let normalized = input::normalize(source)?;
    // The temp guard inside `normalized` outlives the engine call
    vision::extract(normalized.path(), options, engine)
}
