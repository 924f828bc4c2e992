//! Collage composition for a fixed catalog of layouts.
//!
//! Resolves a [`MergeLayout`] against a canvas size into non-overlapping
//! cells, fits each source image into its cell without upscaling, pulls it
//! flush toward the canvas edge the cell faces, and encodes the result as PNG.

pub mod compose;
pub mod geometry;
pub mod imaging;
pub mod layout;
pub mod scale;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use compose::{Compositor, ImageElement, MergeOptions, RenderFailurePolicy};
pub use geometry::{Rect, Size};
pub use imaging::{ImageRsBackend, Imaging, ImagingError};
pub use layout::{Align, CellSpec, MAX_CANVAS_SIDE, MergeLayout, ParseLayoutError, Resolution};

/// Errors that can occur while merging images.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("layout {layout} needs {required} images, got {provided}")]
    NotEnoughImages {
        layout: MergeLayout,
        required: usize,
        provided: usize,
    },

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("canvas {canvas} is smaller than the {min} grid of layout {layout}")]
    CanvasTooSmall {
        layout: MergeLayout,
        canvas: Size,
        min: Size,
    },

    #[error("failed to decode image {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: ImagingError,
    },

    #[error("failed to render image {index}: {source}")]
    Render {
        index: usize,
        #[source]
        source: ImagingError,
    },

    #[error("failed to encode canvas: {0}")]
    Encode(#[source] ImagingError),
}

impl MergeError {
    /// Whether the error was caused by the caller's arguments rather than by
    /// image data.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            MergeError::NotEnoughImages { .. }
                | MergeError::InvalidCanvas { .. }
                | MergeError::CanvasTooSmall { .. }
        )
    }
}

/// Merge decoded images with the default backend and options.
///
/// Shortcut for `Compositor::default().merge(..)`, so it takes the image type
/// of [`ImageRsBackend`]. Callers with another [`Imaging`] backend go through
/// [`Compositor::new`] instead.
pub fn merge_images(
    images: Vec<<ImageRsBackend as Imaging>::Image>,
    layout: MergeLayout,
    canvas: Size,
) -> Result<Vec<u8>, MergeError> {
    Compositor::default().merge(images, layout, canvas)
}
