//! Aspect-preserving fit of a source image into a cell.
//!
//! Sources larger than their cell are shrunk so the relatively larger side
//! matches the cell exactly; smaller sources keep their native size. The
//! result is centered with floor-divided margins, so an odd leftover pixel
//! ends up on the right or bottom side of the image.

use tracing::debug;

use crate::geometry::{Rect, Size};
use crate::imaging::{Imaging, ImagingError};

/// A rendered cell-sized sub-image and where the source landed inside it.
#[derive(Debug, Clone)]
pub struct Fitted<I> {
    pub image: I,
    pub placement: Rect,
}

/// Centered rectangle, relative to the cell, that `source` occupies after
/// fitting into `cell`.
pub fn fit_rect(source: Size, cell: Size) -> Rect {
    let (width, height) = if source.width > cell.width || source.height > cell.height {
        let (sw, sh) = (u64::from(source.width), u64::from(source.height));
        let (cw, ch) = (u64::from(cell.width), u64::from(cell.height));
        if sw * ch > sh * cw {
            let height = rounded_div(cw * sh, sw).max(1).min(ch);
            (cell.width, height as u32)
        } else {
            let width = rounded_div(ch * sw, sh).max(1).min(cw);
            (width as u32, cell.height)
        }
    } else {
        (source.width, source.height)
    };

    Rect::new(
        (cell.width - width) / 2,
        (cell.height - height) / 2,
        width,
        height,
    )
}

/// Render `source` into a transparent `cell`-sized image.
pub fn fit<B: Imaging>(
    backend: &B,
    source: &B::Image,
    cell: Size,
) -> Result<Fitted<B::Image>, ImagingError> {
    let source_size = backend.dimensions(source);
    if source_size.is_empty() {
        return Err(ImagingError::EmptySource(source_size));
    }

    let placement = fit_rect(source_size, cell);
    debug!(%source_size, %cell, ?placement, "Fitting image into cell");
    let image = backend.render(source, cell, placement)?;
    Ok(Fitted { image, placement })
}

fn rounded_div(numerator: u64, denominator: u64) -> u64 {
    (numerator + denominator / 2) / denominator
}
