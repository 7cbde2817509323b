//! Windows OCR backend (Media.Ocr)
//!
//! Uses the built-in Windows OCR API. Media.Ocr reports word rects in pixel
//! coordinates with a top-left origin and exposes neither a speed/accuracy
//! knob nor per-word confidence; the recognition method is accepted and
//! ignored and confidence is reported as 1.0.

use std::path::Path;

use tracing::{debug, info, warn};
use windows::{
    core::HSTRING,
    Foundation::IAsyncOperation,
    Globalization::Language,
    Graphics::Imaging::{BitmapPixelFormat, SoftwareBitmap},
    Media::Ocr::{OcrEngine as WinOcrEngine, OcrResult as WinOcrResult},
};

use crate::error::ExtractError;
use crate::geometry::NormRect;
use crate::vision::engine::{RecognitionEngine, RecognizedSpan, SpanGeometry};
use crate::vision::RecognitionMethod;

fn engine_err(context: &str, e: impl std::fmt::Display) -> ExtractError {
    ExtractError::RecognitionEngine(format!("{context}: {e}"))
}

/// Text recognition via the Windows OCR API
pub struct WindowsOcrEngine {
    engine: WinOcrEngine,
    language: String,
}

impl WindowsOcrEngine {
    /// Create an engine for the given BCP-47 language tag, falling back to
    /// the user profile languages when the tag is unsupported
    pub fn new(language_tag: &str) -> Result<Self, ExtractError> {
        info!("Initializing Windows OCR engine with language: {}", language_tag);

        let language = Language::CreateLanguage(&HSTRING::from(language_tag))
            .map_err(|e| engine_err("failed to create language", e))?;

        if !WinOcrEngine::IsLanguageSupported(&language)
            .map_err(|e| engine_err("failed to check language support", e))?
        {
            warn!("Language '{}' not supported, falling back to system default", language_tag);
            let engine = WinOcrEngine::TryCreateFromUserProfileLanguages()
                .map_err(|e| engine_err("failed to create OCR engine from user profile", e))?;
            let lang_tag = engine
                .RecognizerLanguage()
                .and_then(|l| l.LanguageTag())
                .map_err(|e| engine_err("failed to get recognizer language", e))?
                .to_string();
            return Ok(Self {
                engine,
                language: lang_tag,
            });
        }

        let engine = WinOcrEngine::TryCreateFromLanguage(&language)
            .map_err(|e| engine_err("failed to create OCR engine for language", e))?;

        Ok(Self {
            engine,
            language: language_tag.to_string(),
        })
    }

    /// Get the language the recognizer ended up with
    pub fn language(&self) -> &str {
        &self.language
    }
}

impl RecognitionEngine for WindowsOcrEngine {
    fn recognize(
        &self,
        image: &Path,
        _method: RecognitionMethod,
    ) -> Result<Vec<RecognizedSpan>, ExtractError> {
        let decoded = image::open(image)
            .map_err(|e| ExtractError::ImageDecode {
                path: image.to_path_buf(),
                source: e,
            })?
            .to_rgba8();
        let (width, height) = decoded.dimensions();

        debug!("Windows OCR: processing {}x{} image", width, height);

        let bgra_data = rgba_to_bgra(decoded.as_raw());
        let bitmap = create_software_bitmap(&bgra_data, width, height)?;
        let ocr_result = run_ocr_sync(&self.engine, &bitmap)?;

        extract_spans(&ocr_result, width, height)
    }
}

/// Convert RGBA to BGRA (Windows expects BGRA)
fn rgba_to_bgra(rgba: &[u8]) -> Vec<u8> {
    let mut bgra = rgba.to_vec();
    for chunk in bgra.chunks_exact_mut(4) {
        chunk.swap(0, 2); // Swap R and B
    }
    bgra
}

/// Create a SoftwareBitmap from BGRA data using CopyFromBuffer
fn create_software_bitmap(
    bgra_data: &[u8],
    width: u32,
    height: u32,
) -> Result<SoftwareBitmap, ExtractError> {
    use windows::Storage::Streams::{DataReader, DataWriter, InMemoryRandomAccessStream};

    let stream = InMemoryRandomAccessStream::new()
        .map_err(|e| engine_err("failed to create in-memory stream", e))?;

    let writer = DataWriter::CreateDataWriter(&stream)
        .map_err(|e| engine_err("failed to create data writer", e))?;
    writer
        .WriteBytes(bgra_data)
        .map_err(|e| engine_err("failed to write pixel data", e))?;
    writer
        .StoreAsync()
        .and_then(|op| op.get())
        .map_err(|e| engine_err("failed to store data", e))?;
    writer
        .FlushAsync()
        .and_then(|op| op.get())
        .map_err(|e| engine_err("failed to flush data", e))?;

    stream
        .Seek(0)
        .map_err(|e| engine_err("failed to seek stream", e))?;

    let bitmap = SoftwareBitmap::Create(BitmapPixelFormat::Bgra8, width as i32, height as i32)
        .map_err(|e| engine_err("failed to create SoftwareBitmap", e))?;

    let input_stream = stream
        .GetInputStreamAt(0)
        .map_err(|e| engine_err("failed to get input stream", e))?;
    let reader = DataReader::CreateDataReader(&input_stream)
        .map_err(|e| engine_err("failed to create data reader", e))?;
    reader
        .LoadAsync(bgra_data.len() as u32)
        .and_then(|op| op.get())
        .map_err(|e| engine_err("failed to load data", e))?;
    let buffer = reader
        .ReadBuffer(bgra_data.len() as u32)
        .map_err(|e| engine_err("failed to read buffer", e))?;

    bitmap
        .CopyFromBuffer(&buffer)
        .map_err(|e| engine_err("failed to copy buffer to bitmap", e))?;

    Ok(bitmap)
}

/// Run OCR synchronously (blocks until complete)
fn run_ocr_sync(engine: &WinOcrEngine, bitmap: &SoftwareBitmap) -> Result<WinOcrResult, ExtractError> {
    let async_op: IAsyncOperation<WinOcrResult> = engine
        .RecognizeAsync(bitmap)
        .map_err(|e| engine_err("failed to start OCR recognition", e))?;

    async_op
        .get()
        .map_err(|e| engine_err("OCR recognition failed", e))
}

/// Convert word rects into normalized bottom-left spans
fn extract_spans(
    ocr_result: &WinOcrResult,
    width: u32,
    height: u32,
) -> Result<Vec<RecognizedSpan>, ExtractError> {
    let (width, height) = (f64::from(width), f64::from(height));
    let mut spans = Vec::new();

    let lines = ocr_result
        .Lines()
        .map_err(|e| engine_err("failed to get OCR lines", e))?;

    for i in 0..lines.Size().map_err(|e| engine_err("failed to get lines size", e))? {
        let line = lines
            .GetAt(i)
            .map_err(|e| engine_err("failed to get line", e))?;
        let words = line
            .Words()
            .map_err(|e| engine_err("failed to get words", e))?;

        for j in 0..words.Size().map_err(|e| engine_err("failed to get words size", e))? {
            let word = words
                .GetAt(j)
                .map_err(|e| engine_err("failed to get word", e))?;
            let text = word
                .Text()
                .map_err(|e| engine_err("failed to get word text", e))?
                .to_string();
            let rect = word
                .BoundingRect()
                .map_err(|e| engine_err("failed to get bounding rect", e))?;

            // Media.Ocr rects are top-left anchored pixels; the shared span
            // model wants bottom-left normalized
            let geometry = SpanGeometry::Box(NormRect {
                x: f64::from(rect.X) / width,
                y: (height - f64::from(rect.Y + rect.Height)) / height,
                width: f64::from(rect.Width) / width,
                height: f64::from(rect.Height) / height,
            });

            spans.push(RecognizedSpan {
                text,
                confidence: 1.0, // Media.Ocr doesn't provide confidence
                geometry,
            });
        }
    }

    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_engine() {
        let engine = WindowsOcrEngine::new("en-US");
        assert!(engine.is_ok());
    }

    #[test]
    fn test_rgba_to_bgra_swaps_channels() {
        let rgba = [10u8, 20, 30, 255];
        let bgra = rgba_to_bgra(&rgba);
        assert_eq!(bgra, [30, 20, 10, 255]);
    }
}
