//! Apple Vision backend (macOS)
//!
//! Calls a Swift shim around `VNRecognizeTextRequest` over a C ABI. Vision's
//! completion handler fires inside `performRequests`, so the whole request is
//! one blocking round-trip. The shim reports each span as JSON with the
//! normalized bottom-left quadrilateral and the axis-aligned fallback box.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ExtractError;
use crate::geometry::{NormPoint, NormQuad, NormRect};
use crate::vision::engine::{RecognitionEngine, RecognizedSpan, SpanGeometry};
use crate::vision::RecognitionMethod;

extern "C" {
    fn vision_text_recognize(
        path: *const c_char,
        fast: i32,
        out_data: *mut *mut u8,
        out_len: *mut u64,
        out_error: *mut *mut c_char,
    ) -> i32;

    fn vision_text_free_data(ptr: *mut u8, len: u64);
    fn vision_text_free_error(ptr: *mut c_char);
}

/// Text recognition via the Vision framework
pub struct AppleVisionEngine;

impl AppleVisionEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AppleVisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionEngine for AppleVisionEngine {
    fn recognize(
        &self,
        image: &Path,
        method: RecognitionMethod,
    ) -> Result<Vec<RecognizedSpan>, ExtractError> {
        let path_str = image.to_str().ok_or_else(|| {
            ExtractError::RecognitionEngine("non-utf8 image path".to_string())
        })?;
        let c_path = CString::new(path_str).map_err(|_| {
            ExtractError::RecognitionEngine("null byte in image path".to_string())
        })?;
        let fast = i32::from(method == RecognitionMethod::Fast);

        let mut data: *mut u8 = std::ptr::null_mut();
        let mut len: u64 = 0;
        let mut error: *mut c_char = std::ptr::null_mut();

        let payload = unsafe {
            let status = vision_text_recognize(c_path.as_ptr(), fast, &mut data, &mut len, &mut error);
            take_payload(data, len, error, status)?
        };

        debug!("Vision shim returned {} payload bytes", payload.len());

        parse_spans(&payload)
    }
}

/// Copy the shim's output buffer out and release it, surfacing any shim error
unsafe fn take_payload(
    data: *mut u8,
    len: u64,
    error: *mut c_char,
    status: i32,
) -> Result<Vec<u8>, ExtractError> {
    if status != 0 || !error.is_null() {
        let msg = if !error.is_null() {
            let s = CStr::from_ptr(error).to_string_lossy().into_owned();
            vision_text_free_error(error);
            s
        } else {
            "unknown Vision failure".to_string()
        };
        if !data.is_null() {
            vision_text_free_data(data, len);
        }
        return Err(ExtractError::RecognitionEngine(msg));
    }

    if data.is_null() || len == 0 {
        return Ok(Vec::new());
    }

    let payload = std::slice::from_raw_parts(data, len as usize).to_vec();
    vision_text_free_data(data, len);
    Ok(payload)
}

#[derive(Debug, Deserialize)]
struct WireSpan {
    text: String,
    confidence: f64,
    #[serde(default)]
    quad: Option<WireQuad>,
    #[serde(default, rename = "box")]
    bbox: Option<[f64; 4]>,
}

/// Corner points as [x, y] in normalized bottom-left coordinates
#[derive(Debug, Deserialize)]
struct WireQuad {
    top_left: [f64; 2],
    top_right: [f64; 2],
    bottom_left: [f64; 2],
    bottom_right: [f64; 2],
}

fn parse_spans(payload: &[u8]) -> Result<Vec<RecognizedSpan>, ExtractError> {
    if payload.is_empty() {
        return Ok(Vec::new());
    }

    let wire: Vec<WireSpan> = serde_json::from_slice(payload).map_err(|e| {
        ExtractError::RecognitionEngine(format!("malformed engine payload: {e}"))
    })?;

    wire.into_iter()
        .map(|span| {
            let geometry = if let Some(quad) = span.quad {
                SpanGeometry::Quad(NormQuad {
                    top_left: point(quad.top_left),
                    top_right: point(quad.top_right),
                    bottom_left: point(quad.bottom_left),
                    bottom_right: point(quad.bottom_right),
                })
            } else if let Some([x, y, width, height]) = span.bbox {
                SpanGeometry::Box(NormRect { x, y, width, height })
            } else {
                return Err(ExtractError::RecognitionEngine(format!(
                    "span {:?} carries no geometry",
                    span.text
                )));
            };
            Ok(RecognizedSpan {
                text: span.text,
                confidence: span.confidence,
                geometry,
            })
        })
        .collect()
}

fn point(xy: [f64; 2]) -> NormPoint {
    NormPoint { x: xy[0], y: xy[1] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quad_span() {
        let payload = br#"[{
            "text": "HELLO",
            "confidence": 0.97,
            "quad": {
                "top_left": [0.1, 0.44],
                "top_right": [0.3, 0.44],
                "bottom_left": [0.1, 0.4],
                "bottom_right": [0.3, 0.4]
            },
            "box": [0.1, 0.4, 0.2, 0.04]
        }]"#;
        let spans = parse_spans(payload).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "HELLO");
        assert!(matches!(spans[0].geometry, SpanGeometry::Quad(_)));
    }

    #[test]
    fn test_parse_box_only_span() {
        let payload = br#"[{"text": "x", "confidence": 0.5, "box": [0.0, 0.0, 1.0, 1.0]}]"#;
        let spans = parse_spans(payload).unwrap();
        assert!(matches!(spans[0].geometry, SpanGeometry::Box(_)));
    }

    #[test]
    fn test_parse_empty_payload() {
        assert!(parse_spans(b"").unwrap().is_empty());
        assert!(parse_spans(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_span_without_geometry_is_engine_error() {
        let payload = br#"[{"text": "x", "confidence": 0.5}]"#;
        let err = parse_spans(payload).unwrap_err();
        assert!(matches!(err, ExtractError::RecognitionEngine(_)));
    }

    #[test]
    fn test_malformed_payload_is_engine_error() {
        let err = parse_spans(b"not json").unwrap_err();
        assert!(matches!(err, ExtractError::RecognitionEngine(_)));
    }
}
