//! Grid packing and fit-to-viewport for rendered blocks.
//!
//! Blocks are laid out row-major. Every row is as tall as its tallest block
//! and every column as wide as its widest block, so cards stay aligned even
//! when their sizes differ.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Vertical spacing of the stacked fallback used before a layout exists.
const FALLBACK_ROW_HEIGHT: f64 = 300.0;

/// Result of [`pack_grid`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLayout {
    /// Top-left corner of each block, in canvas space.
    pub positions: Vec<Point>,
    pub col_widths: SmallVec<[f64; 8]>,
    pub row_heights: SmallVec<[f64; 8]>,
}

impl GridLayout {
    /// Total size of the packed grid.
    pub fn content_size(&self) -> Size {
        Size::new(
            self.col_widths.iter().sum(),
            self.row_heights.iter().sum(),
        )
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Pack blocks of the given sizes into `columns` columns.
///
/// A `columns` of zero is treated as one.
pub fn pack_grid(sizes: &[Size], columns: usize) -> GridLayout {
    if sizes.is_empty() {
        return GridLayout::default();
    }
    let cols = columns.clamp(1, sizes.len());
    let rows = sizes.len().div_ceil(cols);

    let mut col_widths: SmallVec<[f64; 8]> = SmallVec::from_elem(0.0, cols);
    let mut row_heights: SmallVec<[f64; 8]> = SmallVec::from_elem(0.0, rows);
    for (i, size) in sizes.iter().enumerate() {
        let (row, col) = (i / cols, i % cols);
        row_heights[row] = row_heights[row].max(size.height);
        col_widths[col] = col_widths[col].max(size.width);
    }

    let positions = (0..sizes.len())
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            Point::new(
                col_widths[..col].iter().sum(),
                row_heights[..row].iter().sum(),
            )
        })
        .collect();

    GridLayout {
        positions,
        col_widths,
        row_heights,
    }
}

/// Where block `index` sits before any layout has been computed.
pub fn fallback_position(index: usize) -> Point {
    Point::new(0.0, index as f64 * FALLBACK_ROW_HEIGHT)
}

/// Global canvas transform: uniform scale about the origin, then translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub offset: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        offset: Vec2::ZERO,
    };

    pub fn to_affine(self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Map a canvas-space point to screen space.
    pub fn to_screen(self, p: Point) -> Point {
        self.to_affine() * p
    }
}

/// Transform that shows the whole content inside the viewport.
///
/// Never enlarges: the scale is capped at 1.0. The scaled content is
/// centred. Empty content yields the identity transform.
pub fn fit_to_viewport(content: Size, viewport: Size, margin: f64) -> ViewTransform {
    if content.width <= 0.0 || content.height <= 0.0 {
        return ViewTransform::IDENTITY;
    }
    let fit_w = (viewport.width - margin) / content.width;
    let fit_h = (viewport.height - margin) / content.height;
    let scale = fit_w.min(fit_h).min(1.0).max(f64::EPSILON);
    let scaled = content * scale;
    ViewTransform {
        scale,
        offset: Vec2::new(
            (viewport.width - scaled.width) / 2.0,
            (viewport.height - scaled.height) / 2.0,
        ),
    }
}
