//! Imaging capability used by the compositor, and its `image` crate backend.
//!
//! Layout resolution and compositing only talk to [`Imaging`]; the pixel work
//! (decode, resample, alpha blending, encode) lives behind it.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use crate::geometry::{Rect, Size};

/// Errors raised by an imaging backend.
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("source image has no pixels ({0})")]
    EmptySource(Size),

    #[error("placement {placement:?} does not fit in a {cell} cell")]
    PlacementOutOfBounds { placement: Rect, cell: Size },

    #[error("image codec error: {0}")]
    Codec(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Decode, render, draw and encode operations the compositor relies on.
///
/// Methods that take an image or canvas by value consume it; the value is
/// released when the call returns.
pub trait Imaging {
    /// Decoded source image or rendered sub-image.
    type Image;
    /// Output buffer being composed into.
    type Canvas;

    fn dimensions(&self, image: &Self::Image) -> Size;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, ImagingError>;

    /// Produce a transparent `cell`-sized image with `source` resampled into
    /// `placement`.
    fn render(
        &self,
        source: &Self::Image,
        cell: Size,
        placement: Rect,
    ) -> Result<Self::Image, ImagingError>;

    /// Fully transparent canvas.
    fn new_canvas(&self, size: Size) -> Self::Canvas;

    /// Alpha-composite `image` with its top-left corner at `origin`. Only
    /// canvas pixels inside `clip` are touched.
    fn draw(&self, canvas: &mut Self::Canvas, image: Self::Image, origin: (i64, i64), clip: Rect);

    /// Serialize the finished canvas as PNG.
    fn encode(&self, canvas: Self::Canvas) -> Result<Vec<u8>, ImagingError>;
}

/// [`Imaging`] implemented with the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct ImageRsBackend {
    filter: FilterType,
}

impl Default for ImageRsBackend {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl ImageRsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the resampling filter used when shrinking sources.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }
}

impl Imaging for ImageRsBackend {
    type Image = DynamicImage;
    type Canvas = RgbaImage;

    fn dimensions(&self, image: &DynamicImage) -> Size {
        Size::new(image.width(), image.height())
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
        image::load_from_memory(bytes).map_err(|e| ImagingError::Codec(Box::new(e)))
    }

    fn render(
        &self,
        source: &DynamicImage,
        cell: Size,
        placement: Rect,
    ) -> Result<DynamicImage, ImagingError> {
        let source_size = self.dimensions(source);
        if source_size.is_empty() {
            return Err(ImagingError::EmptySource(source_size));
        }
        if placement.size().is_empty() || !Rect::from_size(cell).encloses(&placement) {
            return Err(ImagingError::PlacementOutOfBounds { placement, cell });
        }

        let scaled = if placement.size() == source_size {
            source.to_rgba8()
        } else {
            debug!(
                orig_w = source_size.width,
                orig_h = source_size.height,
                new_width = placement.width,
                new_height = placement.height,
                "Resampling source into cell"
            );
            source
                .resize_exact(placement.width, placement.height, self.filter)
                .to_rgba8()
        };

        let mut rendered = RgbaImage::new(cell.width, cell.height);
        imageops::replace(
            &mut rendered,
            &scaled,
            i64::from(placement.x),
            i64::from(placement.y),
        );
        Ok(DynamicImage::ImageRgba8(rendered))
    }

    fn new_canvas(&self, size: Size) -> RgbaImage {
        RgbaImage::new(size.width, size.height)
    }

    fn draw(&self, canvas: &mut RgbaImage, image: DynamicImage, origin: (i64, i64), clip: Rect) {
        let top = image.into_rgba8();
        let bounds = Rect::new(0, 0, canvas.width(), canvas.height());
        for (dx, dy, pixel) in top.enumerate_pixels() {
            let target_x = origin.0 + i64::from(dx);
            let target_y = origin.1 + i64::from(dy);
            if !clip.contains(target_x, target_y) || !bounds.contains(target_x, target_y) {
                continue;
            }
            let (tx, ty) = (target_x as u32, target_y as u32);
            match pixel[3] {
                0 => {}
                255 => canvas.put_pixel(tx, ty, *pixel),
                _ => {
                    let blended = blend_pixel(canvas.get_pixel(tx, ty), pixel);
                    canvas.put_pixel(tx, ty, blended);
                }
            }
        }
    }

    fn encode(&self, canvas: RgbaImage) -> Result<Vec<u8>, ImagingError> {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ImagingError::Codec(Box::new(e)))?;
        Ok(cursor.into_inner())
    }
}

/// Source-over compositing of straight-alpha pixels.
fn blend_pixel(bg: &Rgba<u8>, fg: &Rgba<u8>) -> Rgba<u8> {
    let fa = f32::from(fg[3]) / 255.0;
    let ba = f32::from(bg[3]) / 255.0;
    let out_a = fa + ba * (1.0 - fa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let c = (f32::from(fg[i]) * fa + f32::from(bg[i]) * ba * (1.0 - fa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round() as u8,
    ])
}
