//! Coordinate conversion
//!
//! Recognition engines report geometry in normalized coordinates ([0,1] per
//! axis, origin at the image's bottom-left). This module scales those into
//! pixel space and optionally flips the vertical axis so (0,0) sits at the
//! top-left, the convention most display and plotting libraries expect.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Vertical-origin convention for reported pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// (0,0) at the bottom-left (engine-native)
    #[default]
    Bottom,
    /// (0,0) at the top-left (display/plotting convention)
    Top,
}

/// A point in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned box in normalized coordinates, bottom-left anchored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A text-span quadrilateral in normalized coordinates
///
/// Corner names follow the text baseline, not the image axes: for rotated
/// text the "top" corners are above the baseline in text orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormQuad {
    pub top_left: NormPoint,
    pub top_right: NormPoint,
    pub bottom_left: NormPoint,
    pub bottom_right: NormPoint,
}

/// A point in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Four pixel-space corners of a recognized span
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Polygon {
    pub top_left: PixelPoint,
    pub top_right: PixelPoint,
    pub bottom_left: PixelPoint,
    pub bottom_right: PixelPoint,
}

/// Pixel-space bounds of a recognized span under a chosen origin convention
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBounds {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    /// Baseline tilt from horizontal, in degrees (quad geometry only)
    pub rotation_degrees: Option<f64>,
    /// The four corners themselves (quad geometry only)
    pub polygon: Option<Polygon>,
}

/// Round to 3 decimal digits, the precision of all reported fields
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Convert a normalized axis-aligned box into pixel bounds
///
/// Box geometry carries no orientation, so no rotation or polygon is
/// computable from it.
pub fn rect_to_bounds(rect: &NormRect, image_width: f64, image_height: f64, origin: Origin) -> PixelBounds {
    let xmin = rect.x * image_width;
    let xmax = (rect.x + rect.width) * image_width;
    let mut ymin = rect.y * image_height;
    let mut ymax = (rect.y + rect.height) * image_height;

    if origin == Origin::Top {
        // Flipping inverts the vertical ordering
        (ymin, ymax) = (image_height - ymax, image_height - ymin);
    }

    PixelBounds {
        xmin: round3(xmin),
        ymin: round3(ymin),
        xmax: round3(xmax),
        ymax: round3(ymax),
        rotation_degrees: None,
        polygon: None,
    }
}

/// Convert a normalized quadrilateral into pixel bounds
///
/// The bounding box is taken from the corner extrema, the rotation from the
/// post-transform baseline (top-left to top-right), and the polygon is the
/// four post-transform corners.
pub fn quad_to_bounds(quad: &NormQuad, image_width: f64, image_height: f64, origin: Origin) -> PixelBounds {
    let scale = |p: &NormPoint| -> PixelPoint {
        let y = p.y * image_height;
        PixelPoint {
            x: p.x * image_width,
            y: if origin == Origin::Top { image_height - y } else { y },
        }
    };

    let tl = scale(&quad.top_left);
    let tr = scale(&quad.top_right);
    let bl = scale(&quad.bottom_left);
    let br = scale(&quad.bottom_right);

    let xmin = tl.x.min(bl.x);
    let xmax = tr.x.max(br.x);
    let (ymin, ymax) = match origin {
        // Bottom corners sit below top corners in bottom-origin space
        Origin::Bottom => (bl.y.min(br.y), tl.y.max(tr.y)),
        // After the flip the top corners carry the smaller y values
        Origin::Top => (tl.y.min(tr.y), bl.y.max(br.y)),
    };

    let rotation = (tr.y - tl.y).atan2(tr.x - tl.x).to_degrees();

    let round_point = |p: PixelPoint| PixelPoint {
        x: round3(p.x),
        y: round3(p.y),
    };

    PixelBounds {
        xmin: round3(xmin),
        ymin: round3(ymin),
        xmax: round3(xmax),
        ymax: round3(ymax),
        rotation_degrees: Some(round3(rotation)),
        polygon: Some(Polygon {
            top_left: round_point(tl),
            top_right: round_point(tr),
            bottom_left: round_point(bl),
            bottom_right: round_point(br),
        }),
    }
}
