//! Error taxonomy for text extraction
//!
//! Every failure aborts the call and propagates to the caller; there is no
//! retry and no partial result.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while normalizing input or extracting text
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The image source cannot be used at all (e.g. an empty byte buffer)
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// The system clipboard holds no image data
    #[error("no image data on the system clipboard")]
    ClipboardEmpty,

    /// A pixel buffer could not be interpreted or encoded as an image
    #[error("cannot encode pixel data as an image: {0}")]
    Encoding(String),

    /// The image file is missing, unreadable, or not a valid image
    #[error("cannot decode image at {path:?}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The platform recognition engine reported a failure
    #[error("recognition engine error: {0}")]
    RecognitionEngine(String),
}
