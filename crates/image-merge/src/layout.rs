//! Layout catalog and cell resolution.
//!
//! Every [`MergeLayout`] maps to a [`LayoutDef`]: the number of images it
//! consumes, the grid it divides the canvas into, and a generator that turns a
//! canvas size into the ordered list of [`CellSpec`]s. Cells are handed out in
//! input-image order.
//!
//! Halves and quarters are integer divisions of the canvas. When an axis does
//! not divide evenly, the last slot on that axis (right-most or bottom-most)
//! absorbs the remainder so the cells always tile the canvas exactly.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::MergeError;
use crate::geometry::{Rect, Size};

/// Largest accepted canvas width or height, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 16384;

/// The fixed catalog of collage arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeLayout {
    /// One image covering the whole canvas.
    Single,
    /// Two images, left and right halves.
    TwoSideBySide,
    /// Two images, top and bottom halves.
    TwoStacked,
    /// Left half plus two right quarters.
    ThreeBigLeft,
    /// Two left quarters plus the right half.
    ThreeBigRight,
    /// Top half plus two bottom quarters.
    ThreeBigTop,
    /// Two top quarters plus the bottom half.
    ThreeBigBottom,
    /// 2×2 grid.
    FourGrid,
    /// 4 columns × 2 rows, filled row by row.
    EightRowsOf4,
    /// 2 columns × 4 rows, filled column by column.
    EightColsOf4,
}

/// Edge an image is pulled toward inside its cell, per axis.
///
/// `Near` is left on the horizontal axis and top on the vertical one; `Far`
/// is right or bottom. `Center` applies no correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Near,
    Far,
    Center,
}

/// Destination of one image within the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpec {
    pub rect: Rect,
    pub horizontal: Align,
    pub vertical: Align,
}

/// Static description of a layout variant.
#[derive(Clone, Copy)]
pub struct LayoutDef {
    /// Images consumed by the layout.
    pub required: usize,
    /// Columns of the finest grid the layout uses.
    pub columns: u32,
    /// Rows of the finest grid the layout uses.
    pub rows: u32,
    cells: fn(Size) -> Vec<CellSpec>,
}

impl fmt::Debug for LayoutDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutDef")
            .field("required", &self.required)
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}

/// Outcome of resolving a layout against a canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub required: usize,
    pub cells: Vec<CellSpec>,
}

impl MergeLayout {
    /// Every layout in catalog order.
    pub const ALL: [MergeLayout; 10] = [
        MergeLayout::Single,
        MergeLayout::TwoSideBySide,
        MergeLayout::TwoStacked,
        MergeLayout::ThreeBigLeft,
        MergeLayout::ThreeBigRight,
        MergeLayout::ThreeBigTop,
        MergeLayout::ThreeBigBottom,
        MergeLayout::FourGrid,
        MergeLayout::EightRowsOf4,
        MergeLayout::EightColsOf4,
    ];

    /// Table entry for this layout.
    pub fn definition(self) -> LayoutDef {
        let (required, columns, rows, cells): (usize, u32, u32, fn(Size) -> Vec<CellSpec>) =
            match self {
                MergeLayout::Single => (1, 1, 1, single),
                MergeLayout::TwoSideBySide => (2, 2, 1, two_side_by_side),
                MergeLayout::TwoStacked => (2, 1, 2, two_stacked),
                MergeLayout::ThreeBigLeft => (3, 2, 2, three_big_left),
                MergeLayout::ThreeBigRight => (3, 2, 2, three_big_right),
                MergeLayout::ThreeBigTop => (3, 2, 2, three_big_top),
                MergeLayout::ThreeBigBottom => (3, 2, 2, three_big_bottom),
                MergeLayout::FourGrid => (4, 2, 2, four_grid),
                MergeLayout::EightRowsOf4 => (8, 4, 2, eight_rows_of_4),
                MergeLayout::EightColsOf4 => (8, 2, 4, eight_cols_of_4),
            };
        LayoutDef {
            required,
            columns,
            rows,
            cells,
        }
    }

    /// Number of images this layout consumes.
    pub fn required_images(self) -> usize {
        self.definition().required
    }

    /// Kebab-case name used on the command line and in file names.
    pub fn name(self) -> &'static str {
        match self {
            MergeLayout::Single => "single",
            MergeLayout::TwoSideBySide => "two-side-by-side",
            MergeLayout::TwoStacked => "two-stacked",
            MergeLayout::ThreeBigLeft => "three-big-left",
            MergeLayout::ThreeBigRight => "three-big-right",
            MergeLayout::ThreeBigTop => "three-big-top",
            MergeLayout::ThreeBigBottom => "three-big-bottom",
            MergeLayout::FourGrid => "four-grid",
            MergeLayout::EightRowsOf4 => "eight-rows-of-4",
            MergeLayout::EightColsOf4 => "eight-cols-of-4",
        }
    }

    /// Short tag of the older naming scheme (`Merge2LR`, `Merge4S`, ...).
    pub fn legacy_tag(self) -> &'static str {
        match self {
            MergeLayout::Single => "Merge1C",
            MergeLayout::TwoSideBySide => "Merge2LR",
            MergeLayout::TwoStacked => "Merge2TB",
            MergeLayout::ThreeBigLeft => "Merge3L1R2",
            MergeLayout::ThreeBigRight => "Merge3L2R1",
            MergeLayout::ThreeBigTop => "Merge3T1B2",
            MergeLayout::ThreeBigBottom => "Merge3T2B1",
            MergeLayout::FourGrid => "Merge4S",
            MergeLayout::EightRowsOf4 => "Merge8T4B4",
            MergeLayout::EightColsOf4 => "Merge8L4R4",
        }
    }

    /// Compute the cells of this layout for a canvas.
    ///
    /// Both sides must lie in `1..=MAX_CANVAS_SIDE` and the canvas must hold
    /// at least one pixel per grid slot.
    pub fn resolve(self, canvas: Size) -> Result<Resolution, MergeError> {
        let too_large = canvas.width > MAX_CANVAS_SIDE || canvas.height > MAX_CANVAS_SIDE;
        if canvas.is_empty() || too_large {
            return Err(MergeError::InvalidCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }

        let def = self.definition();
        if canvas.width < def.columns || canvas.height < def.rows {
            return Err(MergeError::CanvasTooSmall {
                layout: self,
                canvas,
                min: Size::new(def.columns, def.rows),
            });
        }

        let cells = (def.cells)(canvas);
        debug!(layout = %self, %canvas, cells = cells.len(), "Resolved layout");
        Ok(Resolution {
            required: def.required,
            cells,
        })
    }
}

impl fmt::Display for MergeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no known layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layout: {0}")]
pub struct ParseLayoutError(pub String);

impl FromStr for MergeLayout {
    type Err = ParseLayoutError;

    /// Accepts the kebab-case name, the variant name or the legacy tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        MergeLayout::ALL
            .into_iter()
            .find(|layout| {
                trimmed.eq_ignore_ascii_case(layout.name())
                    || trimmed.eq_ignore_ascii_case(layout.legacy_tag())
                    || trimmed.eq_ignore_ascii_case(&format!("{layout:?}"))
            })
            .ok_or_else(|| ParseLayoutError(trimmed.to_string()))
    }
}

/// Offset and length of one slot along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    offset: u32,
    len: u32,
}

impl Span {
    fn full(len: u32) -> Self {
        Self { offset: 0, len }
    }
}

/// Divide `total` into `N` slots; the last slot takes the remainder.
fn split<const N: usize>(total: u32) -> [Span; N] {
    let parts = N as u32;
    let base = total / parts;
    std::array::from_fn(|i| {
        let offset = base * i as u32;
        let len = if i + 1 == N { total - offset } else { base };
        Span { offset, len }
    })
}

fn cell(x: Span, y: Span, horizontal: Align, vertical: Align) -> CellSpec {
    CellSpec {
        rect: Rect::new(x.offset, y.offset, x.len, y.len),
        horizontal,
        vertical,
    }
}

fn single(canvas: Size) -> Vec<CellSpec> {
    vec![cell(
        Span::full(canvas.width),
        Span::full(canvas.height),
        Align::Center,
        Align::Center,
    )]
}

fn two_side_by_side(canvas: Size) -> Vec<CellSpec> {
    let [left, right] = split(canvas.width);
    let rows = Span::full(canvas.height);
    vec![
        cell(left, rows, Align::Near, Align::Center),
        cell(right, rows, Align::Far, Align::Center),
    ]
}

fn two_stacked(canvas: Size) -> Vec<CellSpec> {
    let cols = Span::full(canvas.width);
    let [top, bottom] = split(canvas.height);
    vec![
        cell(cols, top, Align::Center, Align::Near),
        cell(cols, bottom, Align::Center, Align::Far),
    ]
}

fn three_big_left(canvas: Size) -> Vec<CellSpec> {
    let [left, right] = split(canvas.width);
    let [top, bottom] = split(canvas.height);
    vec![
        cell(left, Span::full(canvas.height), Align::Near, Align::Center),
        cell(right, top, Align::Far, Align::Near),
        cell(right, bottom, Align::Far, Align::Far),
    ]
}

fn three_big_right(canvas: Size) -> Vec<CellSpec> {
    let [left, right] = split(canvas.width);
    let [top, bottom] = split(canvas.height);
    vec![
        cell(left, top, Align::Near, Align::Near),
        cell(left, bottom, Align::Near, Align::Far),
        cell(right, Span::full(canvas.height), Align::Far, Align::Center),
    ]
}

fn three_big_top(canvas: Size) -> Vec<CellSpec> {
    let [left, right] = split(canvas.width);
    let [top, bottom] = split(canvas.height);
    vec![
        cell(Span::full(canvas.width), top, Align::Center, Align::Near),
        cell(left, bottom, Align::Near, Align::Far),
        cell(right, bottom, Align::Far, Align::Far),
    ]
}

fn three_big_bottom(canvas: Size) -> Vec<CellSpec> {
    let [left, right] = split(canvas.width);
    let [top, bottom] = split(canvas.height);
    vec![
        cell(left, top, Align::Near, Align::Near),
        cell(right, top, Align::Far, Align::Near),
        cell(Span::full(canvas.width), bottom, Align::Center, Align::Far),
    ]
}

fn four_grid(canvas: Size) -> Vec<CellSpec> {
    let [left, right] = split(canvas.width);
    let [top, bottom] = split(canvas.height);
    vec![
        cell(left, top, Align::Near, Align::Near),
        cell(right, top, Align::Far, Align::Near),
        cell(left, bottom, Align::Near, Align::Far),
        cell(right, bottom, Align::Far, Align::Far),
    ]
}

fn eight_rows_of_4(canvas: Size) -> Vec<CellSpec> {
    let columns: [Span; 4] = split(canvas.width);
    let [top, bottom] = split(canvas.height);
    [(top, Align::Near), (bottom, Align::Far)]
        .into_iter()
        .flat_map(|(row, vertical)| {
            columns
                .into_iter()
                .map(move |column| cell(column, row, Align::Center, vertical))
        })
        .collect()
}

fn eight_cols_of_4(canvas: Size) -> Vec<CellSpec> {
    let [left, right] = split(canvas.width);
    let rows: [Span; 4] = split(canvas.height);
    [(left, Align::Near), (right, Align::Far)]
        .into_iter()
        .flat_map(|(column, horizontal)| {
            rows.into_iter()
                .map(move |row| cell(column, row, horizontal, Align::Center))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(layout: MergeLayout, width: u32, height: u32) -> Vec<CellSpec> {
        layout.resolve(Size::new(width, height)).unwrap().cells
    }

    fn rects(layout: MergeLayout, width: u32, height: u32) -> Vec<Rect> {
        cells(layout, width, height).iter().map(|c| c.rect).collect()
    }

    fn assert_tiles(layout: MergeLayout, width: u32, height: u32) {
        let canvas = Rect::from_size(Size::new(width, height));
        let cells = rects(layout, width, height);

        let total: u64 = cells.iter().map(Rect::area).sum();
        assert_eq!(total, canvas.area(), "{layout} at {width}x{height}: area");

        for (i, a) in cells.iter().enumerate() {
            assert!(canvas.encloses(a), "{layout} at {width}x{height}: {a:?} escapes");
            assert!(a.width > 0 && a.height > 0, "{layout}: empty cell {a:?}");
            for b in &cells[i + 1..] {
                assert_eq!(
                    a.intersection(b),
                    None,
                    "{layout} at {width}x{height}: {a:?} overlaps {b:?}"
                );
            }
        }
    }

    #[test]
    fn required_counts_match_catalog() {
        let counts: Vec<usize> = MergeLayout::ALL
            .iter()
            .map(|l| l.required_images())
            .collect();
        assert_eq!(counts, vec![1, 2, 2, 3, 3, 3, 3, 4, 8, 8]);
    }

    #[test]
    fn cell_count_equals_required_count() {
        for layout in MergeLayout::ALL {
            let resolution = layout.resolve(Size::new(400, 400)).unwrap();
            assert_eq!(resolution.cells.len(), resolution.required, "{layout}");
        }
    }

    #[test]
    fn every_layout_tiles_even_canvases() {
        for layout in MergeLayout::ALL {
            for (w, h) in [(400, 400), (400, 200), (8, 8), (1024, 768), (12, 4)] {
                assert_tiles(layout, w, h);
            }
        }
    }

    #[test]
    fn every_layout_tiles_odd_canvases() {
        for layout in MergeLayout::ALL {
            for (w, h) in [(401, 399), (7, 5), (255, 1023), (13, 9)] {
                assert_tiles(layout, w, h);
            }
        }
    }

    #[test]
    fn remainder_goes_to_last_slot() {
        let halves = rects(MergeLayout::TwoSideBySide, 101, 50);
        assert_eq!(halves[0], Rect::new(0, 0, 50, 50));
        assert_eq!(halves[1], Rect::new(50, 0, 51, 50));

        let eighths = rects(MergeLayout::EightRowsOf4, 403, 201);
        assert_eq!(eighths[3], Rect::new(300, 0, 103, 100));
        assert_eq!(eighths[7], Rect::new(300, 100, 103, 101));
    }

    #[test]
    fn single_covers_canvas_without_alignment() {
        let cells = cells(MergeLayout::Single, 300, 200);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].rect, Rect::new(0, 0, 300, 200));
        assert_eq!(cells[0].horizontal, Align::Center);
        assert_eq!(cells[0].vertical, Align::Center);
    }

    #[test]
    fn two_side_by_side_pulls_toward_outer_edges() {
        let cells = cells(MergeLayout::TwoSideBySide, 400, 400);
        assert_eq!(cells[0].rect, Rect::new(0, 0, 200, 400));
        assert_eq!(cells[0].horizontal, Align::Near);
        assert_eq!(cells[1].rect, Rect::new(200, 0, 200, 400));
        assert_eq!(cells[1].horizontal, Align::Far);
        assert!(cells.iter().all(|c| c.vertical == Align::Center));
    }

    #[test]
    fn two_stacked_pulls_toward_outer_edges() {
        let cells = cells(MergeLayout::TwoStacked, 400, 400);
        assert_eq!(cells[0].rect, Rect::new(0, 0, 400, 200));
        assert_eq!(cells[0].vertical, Align::Near);
        assert_eq!(cells[1].rect, Rect::new(0, 200, 400, 200));
        assert_eq!(cells[1].vertical, Align::Far);
        assert!(cells.iter().all(|c| c.horizontal == Align::Center));
    }

    #[test]
    fn three_big_left_geometry() {
        let cells = cells(MergeLayout::ThreeBigLeft, 400, 400);
        assert_eq!(cells[0].rect, Rect::new(0, 0, 200, 400));
        assert_eq!((cells[0].horizontal, cells[0].vertical), (Align::Near, Align::Center));
        assert_eq!(cells[1].rect, Rect::new(200, 0, 200, 200));
        assert_eq!((cells[1].horizontal, cells[1].vertical), (Align::Far, Align::Near));
        assert_eq!(cells[2].rect, Rect::new(200, 200, 200, 200));
        assert_eq!((cells[2].horizontal, cells[2].vertical), (Align::Far, Align::Far));
    }

    #[test]
    fn three_big_right_geometry() {
        let cells = cells(MergeLayout::ThreeBigRight, 400, 400);
        assert_eq!(cells[0].rect, Rect::new(0, 0, 200, 200));
        assert_eq!((cells[0].horizontal, cells[0].vertical), (Align::Near, Align::Near));
        assert_eq!(cells[1].rect, Rect::new(0, 200, 200, 200));
        assert_eq!((cells[1].horizontal, cells[1].vertical), (Align::Near, Align::Far));
        assert_eq!(cells[2].rect, Rect::new(200, 0, 200, 400));
        assert_eq!((cells[2].horizontal, cells[2].vertical), (Align::Far, Align::Center));
    }

    #[test]
    fn three_big_top_geometry() {
        let cells = cells(MergeLayout::ThreeBigTop, 400, 400);
        assert_eq!(cells[0].rect, Rect::new(0, 0, 400, 200));
        assert_eq!((cells[0].horizontal, cells[0].vertical), (Align::Center, Align::Near));
        assert_eq!(cells[1].rect, Rect::new(0, 200, 200, 200));
        assert_eq!((cells[1].horizontal, cells[1].vertical), (Align::Near, Align::Far));
        assert_eq!(cells[2].rect, Rect::new(200, 200, 200, 200));
        assert_eq!((cells[2].horizontal, cells[2].vertical), (Align::Far, Align::Far));
    }

    #[test]
    fn three_big_bottom_geometry() {
        let cells = cells(MergeLayout::ThreeBigBottom, 400, 400);
        assert_eq!(cells[0].rect, Rect::new(0, 0, 200, 200));
        assert_eq!((cells[0].horizontal, cells[0].vertical), (Align::Near, Align::Near));
        assert_eq!(cells[1].rect, Rect::new(200, 0, 200, 200));
        assert_eq!((cells[1].horizontal, cells[1].vertical), (Align::Far, Align::Near));
        assert_eq!(cells[2].rect, Rect::new(0, 200, 400, 200));
        assert_eq!((cells[2].horizontal, cells[2].vertical), (Align::Center, Align::Far));
    }

    #[test]
    fn four_grid_aligns_each_cell_to_its_corner() {
        let cells = cells(MergeLayout::FourGrid, 400, 400);
        let expected = [
            (Rect::new(0, 0, 200, 200), Align::Near, Align::Near),
            (Rect::new(200, 0, 200, 200), Align::Far, Align::Near),
            (Rect::new(0, 200, 200, 200), Align::Near, Align::Far),
            (Rect::new(200, 200, 200, 200), Align::Far, Align::Far),
        ];
        for (cell, (rect, h, v)) in cells.iter().zip(expected) {
            assert_eq!(cell.rect, rect);
            assert_eq!(cell.horizontal, h);
            assert_eq!(cell.vertical, v);
        }
    }

    #[test]
    fn eight_rows_of_4_fills_row_major() {
        let cells = cells(MergeLayout::EightRowsOf4, 400, 200);
        for (i, cell) in cells.iter().enumerate() {
            let (col, row) = (i as u32 % 4, i as u32 / 4);
            assert_eq!(cell.rect, Rect::new(col * 100, row * 100, 100, 100));
            assert_eq!(cell.horizontal, Align::Center);
            let expected = if row == 0 { Align::Near } else { Align::Far };
            assert_eq!(cell.vertical, expected);
        }
    }

    #[test]
    fn eight_cols_of_4_fills_column_major() {
        let cells = cells(MergeLayout::EightColsOf4, 400, 400);
        for (i, cell) in cells.iter().enumerate() {
            let (col, row) = (i as u32 / 4, i as u32 % 4);
            assert_eq!(cell.rect, Rect::new(col * 200, row * 100, 200, 100));
            assert_eq!(cell.vertical, Align::Center);
            let expected = if col == 0 { Align::Near } else { Align::Far };
            assert_eq!(cell.horizontal, expected);
        }
    }

    #[test]
    fn zero_canvas_is_rejected() {
        let err = MergeLayout::Single.resolve(Size::new(0, 10)).unwrap_err();
        assert!(matches!(err, MergeError::InvalidCanvas { width: 0, height: 10 }));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let err = MergeLayout::Single
            .resolve(Size::new(u32::MAX, u32::MAX))
            .unwrap_err();
        assert!(matches!(err, MergeError::InvalidCanvas { .. }));
        assert!(err.is_invalid_input());

        let err = MergeLayout::FourGrid
            .resolve(Size::new(400, MAX_CANVAS_SIDE + 1))
            .unwrap_err();
        assert!(matches!(err, MergeError::InvalidCanvas { width: 400, .. }));

        let side = Size::new(MAX_CANVAS_SIDE, 2);
        assert!(MergeLayout::TwoStacked.resolve(side).is_ok());
    }

    #[test]
    fn canvas_smaller_than_grid_is_rejected() {
        let err = MergeLayout::EightRowsOf4
            .resolve(Size::new(3, 2))
            .unwrap_err();
        assert!(matches!(err, MergeError::CanvasTooSmall { .. }));
        assert!(MergeLayout::EightRowsOf4.resolve(Size::new(4, 2)).is_ok());
    }

    #[test]
    fn parse_accepts_all_spellings() {
        for layout in MergeLayout::ALL {
            assert_eq!(layout.name().parse::<MergeLayout>(), Ok(layout));
            assert_eq!(layout.legacy_tag().parse::<MergeLayout>(), Ok(layout));
            assert_eq!(format!("{layout:?}").parse::<MergeLayout>(), Ok(layout));
        }
        assert_eq!(" FOUR-GRID ".parse::<MergeLayout>(), Ok(MergeLayout::FourGrid));
        assert_eq!(
            "five-way".parse::<MergeLayout>(),
            Err(ParseLayoutError("five-way".into()))
        );
    }
}
