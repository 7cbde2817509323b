//! Recognition engine seam
//!
//! The actual text recognition is performed by an opaque platform service.
//! Backends implement [`RecognitionEngine`] and report spans in normalized
//! bottom-left coordinates; everything above this seam is platform-neutral.

use std::path::Path;

use crate::error::ExtractError;
use crate::geometry::{NormQuad, NormRect};
use crate::vision::RecognitionMethod;

/// One text span reported by the engine, in engine-native coordinates
#[derive(Debug, Clone)]
pub struct RecognizedSpan {
    pub text: String,
    /// Recognition confidence in [0,1]
    pub confidence: f64,
    pub geometry: SpanGeometry,
}

/// Engine geometry variant
///
/// Some engines report only an axis-aligned box, others the full span
/// quadrilateral; both are supported behind this one interface.
#[derive(Debug, Clone)]
pub enum SpanGeometry {
    Box(NormRect),
    Quad(NormQuad),
}

/// A platform text recognition engine
///
/// `recognize` blocks the caller for the duration of the request: one image
/// in, one list of spans out, no retry and no partial results.
pub trait RecognitionEngine {
    fn recognize(
        &self,
        image: &Path,
        method: RecognitionMethod,
    ) -> Result<Vec<RecognizedSpan>, ExtractError>;
}

/// Build the recognition engine for the current platform
#[cfg(target_os = "macos")]
pub fn platform_engine(_language: &str) -> Result<Box<dyn RecognitionEngine>, ExtractError> {
    Ok(Box::new(crate::vision::apple::AppleVisionEngine::new()))
}

/// Build the recognition engine for the current platform
#[cfg(target_os = "windows")]
pub fn platform_engine(language: &str) -> Result<Box<dyn RecognitionEngine>, ExtractError> {
    Ok(Box::new(crate::vision::windows_ocr::WindowsOcrEngine::new(language)?))
}

/// Build the recognition engine for the current platform
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn platform_engine(_language: &str) -> Result<Box<dyn RecognitionEngine>, ExtractError> {
    Err(ExtractError::RecognitionEngine(
        "no platform text recognition engine available on this OS".to_string(),
    ))
}
