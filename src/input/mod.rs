//! Input Normalization
//!
//! Accepts the supported image sources and turns each into a file path the
//! recognition engine can read, creating a temporary file when the source is
//! not already on disk. Temporary files are owned by the returned
//! [`NormalizedImage`] and removed when it drops, on every exit path.

use std::io::Write;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ExtractError;

/// One image input to a single extraction call
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// An image file already on disk
    Path(PathBuf),
    /// Encoded image bytes (PNG, JPEG, ...)
    Bytes(Vec<u8>),
    /// Tightly packed RGBA8 pixels, row-major
    Pixels {
        data: Vec<u8>,
        width: u32,
        height: u32,
    },
    /// The current system clipboard image
    Clipboard,
}

/// A readable image file, with ownership of any temporary file backing it
#[derive(Debug)]
pub struct NormalizedImage {
    path: PathBuf,
    // Deletes the temp file on drop; None for pass-through paths
    _guard: Option<NamedTempFile>,
}

impl NormalizedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Normalize an [`ImageSource`] into a decodable image file on disk
pub fn normalize(source: ImageSource) -> Result<NormalizedImage, ExtractError> {
    match source {
        ImageSource::Path(path) => Ok(NormalizedImage { path, _guard: None }),
        ImageSource::Bytes(bytes) => normalize_bytes(&bytes),
        ImageSource::Pixels { data, width, height } => normalize_pixels(data, width, height),
        ImageSource::Clipboard => normalize_clipboard(),
    }
}

/// Write encoded image bytes verbatim to a temporary file
fn normalize_bytes(bytes: &[u8]) -> Result<NormalizedImage, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::UnsupportedInput("empty byte buffer".to_string()));
    }

    let mut file = NamedTempFile::new()
        .map_err(|e| ExtractError::Encoding(format!("cannot create temporary file: {e}")))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| ExtractError::Encoding(format!("cannot write temporary file: {e}")))?;

    debug!("Wrote {} image bytes to {:?}", bytes.len(), file.path());

    Ok(NormalizedImage {
        path: file.path().to_path_buf(),
        _guard: Some(file),
    })
}

/// Encode an RGBA8 pixel buffer as PNG into a temporary file
fn normalize_pixels(data: Vec<u8>, width: u32, height: u32) -> Result<NormalizedImage, ExtractError> {
    if width == 0 || height == 0 {
        return Err(ExtractError::Encoding(format!(
            "zero-sized pixel buffer ({width}x{height})"
        )));
    }
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(ExtractError::Encoding(format!(
            "pixel buffer length {} does not match {width}x{height} RGBA ({expected} bytes)",
            data.len()
        )));
    }

    let buffer = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        ExtractError::Encoding(format!("cannot interpret buffer as {width}x{height} RGBA image"))
    })?;

    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .map_err(|e| ExtractError::Encoding(format!("cannot create temporary file: {e}")))?;

    DynamicImage::ImageRgba8(buffer)
        .save(file.path())
        .map_err(|e| ExtractError::Encoding(format!("cannot encode pixels as PNG: {e}")))?;

    debug!("Encoded {}x{} pixel buffer to {:?}", width, height, file.path());

    Ok(NormalizedImage {
        path: file.path().to_path_buf(),
        _guard: Some(file),
    })
}

/// Read the clipboard image (RGBA) and encode it as PNG into a temporary file
fn normalize_clipboard() -> Result<NormalizedImage, ExtractError> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| {
        ExtractError::UnsupportedInput(format!("system clipboard unavailable: {e}"))
    })?;

    let img = clipboard.get_image().map_err(|e| match e {
        arboard::Error::ContentNotAvailable => ExtractError::ClipboardEmpty,
        other => ExtractError::UnsupportedInput(format!("cannot read clipboard image: {other}")),
    })?;

    debug!("Read {}x{} image from clipboard", img.width, img.height);

    normalize_pixels(
        img.bytes.into_owned(),
        img.width as u32,
        img.height as u32,
    )
}
