//! Collage composition: resolve cells, fit each image, align, draw, encode.

use tracing::{debug, info, warn};

use crate::MergeError;
use crate::geometry::{Rect, Size};
use crate::imaging::{ImageRsBackend, Imaging};
use crate::layout::{Align, CellSpec, MergeLayout};
use crate::scale;

/// What to do when an image cannot be rendered into its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFailurePolicy {
    /// Abort the merge with [`MergeError::Render`].
    #[default]
    Fail,
    /// Draw the unscaled source at the cell origin and keep going.
    PassThrough,
}

/// Options controlling a merge.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub render_failure: RenderFailurePolicy,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the render failure policy.
    pub fn with_render_failure(mut self, policy: RenderFailurePolicy) -> Self {
        self.render_failure = policy;
        self
    }
}

/// One image ready to be drawn into its cell.
#[derive(Debug)]
pub struct ImageElement<I> {
    /// Rendered sub-image, cell-sized unless produced by a pass-through.
    pub image: I,
    /// Region of `image` that is drawn; always the whole image.
    pub src: Rect,
    /// Cell the image belongs to.
    pub dest: Rect,
    pub offset_x: i64,
    pub offset_y: i64,
}

impl<I> ImageElement<I> {
    /// Canvas position of the top-left corner of `image`.
    pub fn origin(&self) -> (i64, i64) {
        (
            i64::from(self.dest.x) + self.offset_x,
            i64::from(self.dest.y) + self.offset_y,
        )
    }
}

/// Shift that moves a centered image of length `placed` flush against the
/// edge selected by `align`. `margin` is the near-side centering margin.
pub fn alignment_offset(align: Align, margin: u32, cell: u32, placed: u32) -> i64 {
    match align {
        Align::Near => -i64::from(margin),
        Align::Far => i64::from(cell - placed - margin),
        Align::Center => 0,
    }
}

/// Merges images into a collage using an [`Imaging`] backend.
#[derive(Debug, Clone)]
pub struct Compositor<B = ImageRsBackend> {
    backend: B,
    options: MergeOptions,
}

impl Default for Compositor<ImageRsBackend> {
    fn default() -> Self {
        Self::new(ImageRsBackend::default())
    }
}

impl<B: Imaging> Compositor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            options: MergeOptions::default(),
        }
    }

    /// Builder: replace the merge options.
    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Decode raw image payloads in order. The first failure aborts.
    pub fn decode_all<T: AsRef<[u8]>>(&self, payloads: &[T]) -> Result<Vec<B::Image>, MergeError> {
        payloads
            .iter()
            .enumerate()
            .map(|(index, bytes)| {
                self.backend
                    .decode(bytes.as_ref())
                    .map_err(|source| MergeError::Decode { index, source })
            })
            .collect()
    }

    /// Merge `images` into an encoded PNG.
    pub fn merge(
        &self,
        images: Vec<B::Image>,
        layout: MergeLayout,
        canvas: Size,
    ) -> Result<Vec<u8>, MergeError> {
        let composed = self.compose(images, layout, canvas)?;
        let bytes = self.backend.encode(composed).map_err(MergeError::Encode)?;
        info!(%layout, %canvas, bytes = bytes.len(), "Merged images");
        Ok(bytes)
    }

    /// Merge `images` and return the canvas without encoding it.
    ///
    /// Images past the layout's required count are released unused.
    pub fn compose(
        &self,
        images: Vec<B::Image>,
        layout: MergeLayout,
        canvas: Size,
    ) -> Result<B::Canvas, MergeError> {
        let required = layout.required_images();
        if images.len() < required {
            return Err(MergeError::NotEnoughImages {
                layout,
                required,
                provided: images.len(),
            });
        }
        let resolution = layout.resolve(canvas)?;
        if images.len() > required {
            debug!(
                %layout,
                required,
                provided = images.len(),
                "Ignoring images beyond the layout's count"
            );
        }

        let mut target = self.backend.new_canvas(canvas);
        for (index, (image, cell)) in images.into_iter().zip(&resolution.cells).enumerate() {
            let element = self.prepare(index, image, cell)?;
            debug!(
                index,
                dest = ?element.dest,
                offset_x = element.offset_x,
                offset_y = element.offset_y,
                "Drawing cell"
            );
            let origin = element.origin();
            self.backend.draw(&mut target, element.image, origin, element.dest);
        }
        Ok(target)
    }

    /// Fit `source` into `cell` and compute its alignment correction. The
    /// source is released before returning.
    fn prepare(
        &self,
        index: usize,
        source: B::Image,
        cell: &CellSpec,
    ) -> Result<ImageElement<B::Image>, MergeError> {
        let cell_size = cell.rect.size();
        match scale::fit(&self.backend, &source, cell_size) {
            Ok(fitted) => {
                let placement = fitted.placement;
                Ok(ImageElement {
                    src: Rect::from_size(cell_size),
                    dest: cell.rect,
                    offset_x: alignment_offset(
                        cell.horizontal,
                        placement.x,
                        cell_size.width,
                        placement.width,
                    ),
                    offset_y: alignment_offset(
                        cell.vertical,
                        placement.y,
                        cell_size.height,
                        placement.height,
                    ),
                    image: fitted.image,
                })
            }
            Err(source_err) => match self.options.render_failure {
                RenderFailurePolicy::Fail => Err(MergeError::Render {
                    index,
                    source: source_err,
                }),
                RenderFailurePolicy::PassThrough => {
                    warn!(index, "Render failed, drawing source unscaled: {source_err}");
                    let size = self.backend.dimensions(&source);
                    Ok(ImageElement {
                        image: source,
                        src: Rect::from_size(size),
                        dest: cell.rect,
                        offset_x: 0,
                        offset_y: 0,
                    })
                }
            },
        }
    }
}
